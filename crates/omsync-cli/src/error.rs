use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] omsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Another sync is already running for profile '{0}'")]
    SyncInProgress(String),
    #[error("Sync finished with {0} failed phase(s)")]
    SyncFailed(usize),
    #[error(
        "Profile '{profile}' is not ready to sync. Missing: {missing}. Run `omsync config init` and `omsync auth login`."
    )]
    SyncNotConfigured { profile: String, missing: String },
}
