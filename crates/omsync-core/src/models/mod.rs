//! Data models for omsync

mod memo;
mod resource;
mod settings;
mod user;

pub use memo::{Memo, MemoPage};
pub use resource::{Resource, ResourceList};
pub use settings::{SyncSettings, DEFAULT_ATTACHMENTS_FOLDER, DEFAULT_NOTES_FOLDER};
pub use user::{User, UserId, UserSearch};
