//! omsync-core - Core library for omsync
//!
//! This crate contains the Memos models, the remote client, the vault store
//! and the incremental sync engine used by the `omsync` CLI.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Memo, Resource, SyncSettings};
