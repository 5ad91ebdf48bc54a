//! Memo model

use serde::{Deserialize, Serialize};

/// A note as served by the Memos API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    /// Resource name, e.g. `memos/42`
    pub name: String,
    /// Markdown body
    #[serde(default)]
    pub content: String,
    /// Last update timestamp (RFC 3339)
    #[serde(default)]
    pub update_time: String,
    /// Owning account, e.g. `users/1`
    #[serde(default)]
    pub creator: String,
}

impl Memo {
    /// Create a memo with the given name, body and update time.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        update_time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            update_time: update_time.into(),
            creator: String::new(),
        }
    }
}

/// One page of the memo listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoPage {
    #[serde(default)]
    pub memos: Vec<Memo>,
    /// Cursor for the next page; empty when there are no more pages.
    #[serde(default)]
    pub next_page_token: String,
}

impl MemoPage {
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        !self.next_page_token.trim().is_empty()
    }
}
