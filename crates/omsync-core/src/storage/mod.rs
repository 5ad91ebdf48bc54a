//! Storage abstractions for the local vault.

mod vault;

pub use vault::{FileStore, VaultStore};
