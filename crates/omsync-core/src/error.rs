//! Error types for omsync-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using omsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in omsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("Memos API error: {0}")]
    Api(String),

    /// Local file already exists at the derived path
    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Sync configuration is incomplete or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
