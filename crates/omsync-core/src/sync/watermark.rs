//! Watermark-based change detection.

use serde::{Deserialize, Serialize};

use crate::models::{Memo, Resource};
use crate::util::parse_timestamp_millis;

/// Unix-ms boundary between already-synced and not-yet-synced content.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Watermark(i64);

impl Watermark {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Strictly later than the watermark; equality is not new.
    #[must_use]
    pub const fn admits(self, timestamp_ms: i64) -> bool {
        timestamp_ms > self.0
    }

    /// Move to `now`, never backwards.
    #[must_use]
    pub fn advanced_to(self, now_ms: i64) -> Self {
        Self(self.0.max(now_ms))
    }
}

/// Remote entity carrying the timestamp used for change detection.
pub trait Timestamped {
    /// RFC 3339 timestamp compared against the watermark.
    fn sync_timestamp(&self) -> &str;

    /// Identifier used in log lines.
    fn sync_label(&self) -> &str;
}

impl Timestamped for Memo {
    fn sync_timestamp(&self) -> &str {
        &self.update_time
    }

    fn sync_label(&self) -> &str {
        &self.name
    }
}

impl Timestamped for Resource {
    fn sync_timestamp(&self) -> &str {
        &self.create_time
    }

    fn sync_label(&self) -> &str {
        &self.name
    }
}

/// Whether `entity` changed after `watermark`.
///
/// Unparseable timestamps never count as new.
pub fn is_new<T: Timestamped>(entity: &T, watermark: Watermark) -> bool {
    if let Some(timestamp) = parse_timestamp_millis(entity.sync_timestamp()) {
        watermark.admits(timestamp)
    } else {
        tracing::warn!(
            entity = entity.sync_label(),
            timestamp = entity.sync_timestamp(),
            "Skipping entity with unparseable timestamp"
        );
        false
    }
}

/// Keep the entities newer than `watermark`, preserving order.
pub fn filter_new<T: Timestamped>(entities: Vec<T>, watermark: Watermark) -> Vec<T> {
    entities
        .into_iter()
        .filter(|entity| is_new(entity, watermark))
        .collect()
}
