use std::env;
use std::path::{Path, PathBuf};

use omsync_core::util::normalize_text_option;
use omsync_core::SyncSettings;

use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub const URL_ENV: &str = "OMSYNC_URL";

/// Profiles file plus the profile a command acts on.
pub struct ProfileContext {
    pub config: CliProfilesConfig,
    pub name: String,
}

impl ProfileContext {
    pub fn load(explicit: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let name = config.resolve_profile_name(explicit);
        Ok(Self { config, name })
    }

    pub fn load_from_path(path: &Path, explicit: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load_from_path(path).map_err(CliError::Config)?;
        let name = config.resolve_profile_name(explicit);
        Ok(Self { config, name })
    }

    /// Stored profile, or an empty one when it has never been initialized.
    pub fn profile(&self) -> CliProfile {
        self.config.profile(&self.name).cloned().unwrap_or_default()
    }

    pub fn is_configured(&self) -> bool {
        self.config.profile(&self.name).is_some()
    }
}

/// Merge a stored profile with run-time overrides into engine settings.
pub fn settings_for_profile(
    profile: &CliProfile,
    token: Option<String>,
    url_override: Option<String>,
) -> SyncSettings {
    SyncSettings {
        url: normalize_text_option(url_override)
            .or_else(|| profile.url())
            .unwrap_or_default(),
        token: normalize_text_option(token).unwrap_or_default(),
        user_id: profile.user_id().unwrap_or_default(),
        notes_folder: profile.notes_folder(),
        attachments_folder: profile.attachments_folder(),
        last_sync: profile.last_sync,
    }
}

pub fn url_override() -> Option<String> {
    normalize_text_option(env::var(URL_ENV).ok())
}

pub fn resolve_vault_root(cli_vault: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_vault {
        Some(path) => Ok(path),
        None => Ok(env::current_dir()?),
    }
}

pub fn display_vault_root(vault_root: &Path) -> String {
    vault_root
        .canonicalize()
        .unwrap_or_else(|_| vault_root.to_path_buf())
        .display()
        .to_string()
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Status line for a watermark: `Never synced` or `Synced 5m ago`.
pub fn describe_last_sync(last_sync_ms: i64, now_ms: i64) -> String {
    if last_sync_ms <= 0 {
        "Never synced".to_string()
    } else {
        format!("Synced {}", format_relative_time(last_sync_ms, now_ms))
    }
}
