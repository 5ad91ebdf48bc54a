//! File-system backed vault store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Local file operations consumed by the sync engine.
///
/// `create` and `create_binary` never overwrite: an existing file at `path`
/// is reported as [`Error::AlreadyExists`].
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create a new text file.
    async fn create(&self, path: &Path, content: &str) -> Result<()>;

    /// Create a new binary file.
    async fn create_binary(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Append text to an existing file.
    async fn append(&self, path: &Path, text: &str) -> Result<()>;

    /// Look up a file; `None` when nothing exists at `path`.
    async fn get_file_by_path(&self, path: &Path) -> Result<Option<PathBuf>>;
}

/// [`FileStore`] on top of `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultStore;

impl VaultStore {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn create_new(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|error| {
                if error.kind() == ErrorKind::AlreadyExists {
                    Error::AlreadyExists(path.to_path_buf())
                } else {
                    Error::Io(error)
                }
            })?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for VaultStore {
    async fn create(&self, path: &Path, content: &str) -> Result<()> {
        Self::create_new(path, content.as_bytes()).await
    }

    async fn create_binary(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        Self::create_new(path, bytes).await
    }

    async fn append(&self, path: &Path, text: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(path).await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn get_file_by_path(&self, path: &Path) -> Result<Option<PathBuf>> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(path.to_path_buf())),
            Ok(_) => Ok(None),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::Io(error)),
        }
    }
}
