//! Sync settings model

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;

pub const DEFAULT_NOTES_FOLDER: &str = "memos";
pub const DEFAULT_ATTACHMENTS_FOLDER: &str = "attachments";

/// Settings owned by the host layer and handed to the sync engine.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Memos instance URL, e.g. `https://memos.example.com`
    pub url: String,
    /// Bearer access token
    pub token: String,
    /// Resolved account reference, e.g. `users/1`
    pub user_id: String,
    /// Vault-relative folder for memo markdown files
    pub notes_folder: String,
    /// Vault-relative folder for attachment files
    pub attachments_folder: String,
    /// Watermark of the last completed sync (Unix ms)
    pub last_sync: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            user_id: String::new(),
            notes_folder: DEFAULT_NOTES_FOLDER.to_string(),
            attachments_folder: DEFAULT_ATTACHMENTS_FOLDER.to_string(),
            last_sync: 0,
        }
    }
}

impl std::fmt::Debug for SyncSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SyncSettings")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("notes_folder", &self.notes_folder)
            .field("attachments_folder", &self.attachments_folder)
            .field("last_sync", &self.last_sync)
            .finish()
    }
}

impl SyncSettings {
    /// Names of the required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("url", &self.url),
            ("token", &self.token),
            ("user_id", &self.user_id),
            ("notes_folder", &self.notes_folder),
            ("attachments_folder", &self.attachments_folder),
        ] {
            if normalize_text_option(Some(value.clone())).is_none() {
                missing.push(field);
            }
        }
        missing
    }
}
