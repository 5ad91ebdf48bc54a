//! Per-run sync configuration.
//!
//! [`SyncConfig`] is an immutable snapshot of [`SyncSettings`] taken at the
//! start of a run. The engines only ever see this snapshot; the watermark is
//! carried separately by the orchestrator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::SyncSettings;
use crate::util::{is_http_url, normalize_text_option};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Validated, immutable configuration for one sync run.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    base_url: String,
    token: String,
    user_id: String,
    notes_dir: PathBuf,
    attachments_dir: PathBuf,
    request_timeout: Duration,
}

impl SyncConfig {
    /// Build a snapshot from host settings, resolving folders under `vault_root`.
    ///
    /// Every field must be non-empty and the URL must be http(s).
    pub fn from_settings(settings: &SyncSettings, vault_root: &Path) -> Result<Self> {
        let missing = settings.missing_fields();
        if !missing.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "sync settings are incomplete. Missing: {}",
                missing.join(", ")
            )));
        }

        let base_url = normalize_base_url(&settings.url)?;
        let notes_folder = normalize_folder(&settings.notes_folder, "notes_folder")?;
        let attachments_folder =
            normalize_folder(&settings.attachments_folder, "attachments_folder")?;

        Ok(Self {
            base_url,
            token: settings.token.trim().to_string(),
            user_id: settings.user_id.trim().to_string(),
            notes_dir: vault_root.join(notes_folder),
            attachments_dir: vault_root.join(attachments_folder),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    pub fn attachments_dir(&self) -> &Path {
        &self.attachments_dir
    }

    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SyncConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("notes_dir", &self.notes_dir)
            .field("attachments_dir", &self.attachments_dir)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Trim a base URL and strip trailing slashes; the scheme is required.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let base = normalize_text_option(Some(raw.to_string()))
        .ok_or_else(|| Error::InvalidConfig("url must not be empty".to_string()))?;
    if !is_http_url(&base) {
        return Err(Error::InvalidConfig(
            "url must include http:// or https://".to_string(),
        ));
    }
    Ok(base.trim_end_matches('/').to_string())
}

fn normalize_folder(raw: &str, field: &str) -> Result<PathBuf> {
    let folder = raw.trim().trim_matches('/');
    if folder.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} must not be empty")));
    }
    let path = PathBuf::from(folder);
    if path
        .components()
        .any(|component| matches!(component, std::path::Component::ParentDir))
    {
        return Err(Error::InvalidConfig(format!(
            "{field} must stay inside the vault"
        )));
    }
    Ok(path)
}
