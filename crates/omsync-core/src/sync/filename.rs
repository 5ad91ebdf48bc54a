//! Local file names for downloaded attachments.
//!
//! Names take the form `{stem}-{hash5}.{ext}`. The 5-character suffix is a
//! digest of `createTime`, so re-syncing the same resource derives the same
//! name while two uploads sharing a stem stay apart.

use sha2::{Digest, Sha256};

use crate::models::Resource;
use crate::sync::paths::sanitize_identifier;

const SUFFIX_LEN: usize = 5;
const FALLBACK_STEM: &str = "attachment";
const FALLBACK_EXTENSION: &str = "bin";

// mime_guess lists extensions alphabetically (`image/jpeg` -> `jfif`), so the
// usual ones are pinned here.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/heic", "heic"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tiff"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/json", "json"),
    ("text/plain", "txt"),
    ("text/markdown", "md"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("audio/mpeg", "mp3"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/ogg", "ogg"),
    ("audio/webm", "weba"),
    ("audio/mp4", "m4a"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
    ("video/quicktime", "mov"),
];

/// Derive the vault file name for `resource`. Pure; performs no I/O.
pub fn resolve_attachment_file_name(resource: &Resource) -> String {
    format!(
        "{}-{}.{}",
        attachment_stem(resource),
        create_time_suffix(&resource.create_time),
        extension_for_mime(&resource.mime_type)
    )
}

/// First 5 lowercase hex characters of SHA-256(`create_time`).
pub fn create_time_suffix(create_time: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(create_time.as_bytes()));
    digest[..SUFFIX_LEN].to_string()
}

/// File extension for a MIME type, ignoring parameters such as `charset`.
pub fn extension_for_mime(mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some((_, extension)) = PREFERRED_EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == essence)
    {
        return (*extension).to_string();
    }

    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|extensions| extensions.first())
        .map_or_else(|| FALLBACK_EXTENSION.to_string(), |extension| (*extension).to_string())
}

fn attachment_stem(resource: &Resource) -> String {
    resource
        .filename
        .as_deref()
        .and_then(|filename| filename.trim().split('.').next())
        .map(sanitize_identifier)
        .filter(|stem| !stem.is_empty())
        .or_else(|| Some(sanitize_identifier(&resource.name)).filter(|stem| !stem.is_empty()))
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}
