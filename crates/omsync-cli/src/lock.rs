//! Per-profile lock so only one sync runs against a profile at a time.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::CliError;

/// Held for the duration of a sync. The OS releases the lock when dropped.
#[derive(Debug)]
pub struct SyncLock {
    file: File,
    path: PathBuf,
}

impl SyncLock {
    pub fn acquire(lock_dir: &Path, profile_name: &str) -> Result<Self, CliError> {
        fs::create_dir_all(lock_dir)?;
        let path = lock_dir.join(format!("sync-{}.lock", lock_file_stem(profile_name)));
        let file = File::create(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| CliError::SyncInProgress(profile_name.to_string()))?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Default lock directory, next to the profiles file.
pub fn default_lock_dir() -> Result<PathBuf, CliError> {
    crate::config_profiles::default_config_path()
        .map_err(CliError::Config)?
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| CliError::Config("Failed to resolve CLI lock directory".to_string()))
}

fn lock_file_stem(profile_name: &str) -> String {
    profile_name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
