//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use omsync_core::models::{DEFAULT_ATTACHMENTS_FOLDER, DEFAULT_NOTES_FOLDER};
use omsync_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "omsync";
const CONFIG_FILE_NAME: &str = "cli-config.json";
pub const PROFILE_ENV: &str = "OMSYNC_PROFILE";
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

/// One Memos account mirrored into a vault. The token lives in the keychain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub notes_folder: Option<String>,
    #[serde(default)]
    pub attachments_folder: Option<String>,
    /// Watermark of the last completed sync (Unix ms)
    #[serde(default)]
    pub last_sync: i64,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    normalize_text_option(value.map(str::to_string))
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// `--profile`, then `OMSYNC_PROFILE`, then the active profile, then `default`.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        self.resolve_profile_name_with_env(explicit, std::env::var(PROFILE_ENV).ok().as_deref())
    }

    fn resolve_profile_name_with_env(&self, explicit: Option<&str>, env: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(env))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    pub fn url(&self) -> Option<String> {
        normalize_text_option(self.url.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        normalize_text_option(self.user_id.clone())
    }

    pub fn notes_folder(&self) -> String {
        normalize_text_option(self.notes_folder.clone())
            .unwrap_or_else(|| DEFAULT_NOTES_FOLDER.to_string())
    }

    pub fn attachments_folder(&self) -> String {
        normalize_text_option(self.attachments_folder.clone())
            .unwrap_or_else(|| DEFAULT_ATTACHMENTS_FOLDER.to_string())
    }

    fn normalize(&mut self) {
        self.url = normalize_text_option(self.url.clone());
        self.user_name = normalize_text_option(self.user_name.clone());
        self.user_id = normalize_text_option(self.user_id.clone());
        self.notes_folder = normalize_text_option(self.notes_folder.clone());
        self.attachments_folder = normalize_text_option(self.attachments_folder.clone());
        self.last_sync = self.last_sync.max(0);
    }
}
