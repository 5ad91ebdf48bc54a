//! Deterministic vault paths for remote entities.

use std::path::{Path, PathBuf};

/// Replace path separators so a remote identifier stays a single file name.
///
/// `memos/42` becomes `memos-42`.
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .trim()
        .replace(|c: char| c == '/' || c == '\\', "-")
}

/// Markdown file name for a memo, e.g. `memos-42.md`.
pub fn note_file_name(memo_name: &str) -> String {
    format!("{}.md", sanitize_identifier(memo_name))
}

/// `{notes_dir}/{sanitized-name}.md`
pub fn note_path(notes_dir: &Path, memo_name: &str) -> PathBuf {
    notes_dir.join(note_file_name(memo_name))
}

/// Markdown embed appended to a memo file when relinking an attachment.
pub fn embed_line(attachment_file_name: &str) -> String {
    format!("\n\n![[{attachment_file_name}]]")
}
