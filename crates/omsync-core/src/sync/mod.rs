//! Incremental one-way sync of memos and resources into the vault.
//!
//! A run is sequenced by [`SyncOrchestrator`]: memos first, then resources,
//! then the watermark commit. Each phase reports a [`PhaseOutcome`] instead
//! of propagating errors, so a broken phase never hides the other.

mod attachments;
mod filename;
mod notes;
mod orchestrator;
mod paths;
mod report;
mod watermark;

#[cfg(test)]
mod testing;

pub use attachments::AttachmentSyncEngine;
pub use filename::{create_time_suffix, extension_for_mime, resolve_attachment_file_name};
pub use notes::{NoteSyncEngine, PaginationPolicy};
pub use orchestrator::{SyncOrchestrator, WatermarkPolicy};
pub use paths::{embed_line, note_file_name, note_path, sanitize_identifier};
pub use report::{PhaseOutcome, PhaseReport, SyncPhase, SyncReport, SyncWarning};
pub use watermark::{filter_new, is_new, Timestamped, Watermark};
