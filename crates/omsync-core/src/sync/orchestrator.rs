//! Sequencing of one sync run and the watermark commit.

use tracing::{info, warn};

use crate::api::RemoteApi;
use crate::config::SyncConfig;
use crate::storage::FileStore;
use crate::sync::attachments::AttachmentSyncEngine;
use crate::sync::notes::{NoteSyncEngine, PaginationPolicy};
use crate::sync::report::SyncReport;
use crate::sync::watermark::Watermark;
use crate::util::unix_timestamp_millis_now;

/// What happens to the watermark when a phase failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatermarkPolicy {
    /// Advance to "now" after every run. Content that failed to sync is not
    /// retried by later runs.
    #[default]
    AlwaysAdvance,
    /// Keep the previous watermark if either phase failed.
    HoldOnFailure,
}

/// Runs the memo phase, then the attachment phase, then moves the watermark.
///
/// Both phases filter against the watermark the run started with. The
/// orchestrator owns the watermark cell; `run` takes `&mut self`, so a single
/// orchestrator never has two runs in flight.
pub struct SyncOrchestrator<'a> {
    api: &'a dyn RemoteApi,
    store: &'a dyn FileStore,
    config: &'a SyncConfig,
    watermark: Watermark,
    pagination: PaginationPolicy,
    watermark_policy: WatermarkPolicy,
    clock: fn() -> i64,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        api: &'a dyn RemoteApi,
        store: &'a dyn FileStore,
        config: &'a SyncConfig,
        watermark: Watermark,
    ) -> Self {
        Self {
            api,
            store,
            config,
            watermark,
            pagination: PaginationPolicy::default(),
            watermark_policy: WatermarkPolicy::default(),
            clock: unix_timestamp_millis_now,
        }
    }

    #[must_use]
    pub const fn with_pagination_policy(mut self, policy: PaginationPolicy) -> Self {
        self.pagination = policy;
        self
    }

    #[must_use]
    pub const fn with_watermark_policy(mut self, policy: WatermarkPolicy) -> Self {
        self.watermark_policy = policy;
        self
    }

    /// Replace the wall clock (Unix ms) used for the watermark commit.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub const fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// Run both phases in order. Never fails; phase errors are in the report.
    pub async fn run(&mut self) -> SyncReport {
        let previous = self.watermark;
        info!(
            user = self.config.user_id(),
            watermark = previous.as_millis(),
            "Starting sync"
        );

        let notes = NoteSyncEngine::new(self.api, self.store, self.config, previous)
            .with_policy(self.pagination)
            .sync_notes()
            .await;
        let attachments = AttachmentSyncEngine::new(self.api, self.store, self.config, previous)
            .sync_attachments()
            .await;

        let failed = notes.outcome.is_failed() || attachments.outcome.is_failed();
        let now = (self.clock)();
        self.watermark = match self.watermark_policy {
            WatermarkPolicy::HoldOnFailure if failed => {
                warn!(
                    watermark = previous.as_millis(),
                    "Sync had failures; keeping previous watermark"
                );
                previous
            }
            WatermarkPolicy::AlwaysAdvance | WatermarkPolicy::HoldOnFailure => {
                if failed {
                    warn!("Sync had failures; advancing watermark anyway");
                }
                previous.advanced_to(now)
            }
        };

        info!(
            notes = notes.written,
            attachments = attachments.written,
            watermark = self.watermark.as_millis(),
            "Sync finished"
        );

        SyncReport {
            notes,
            attachments,
            previous_watermark: previous,
            watermark: self.watermark,
        }
    }
}
