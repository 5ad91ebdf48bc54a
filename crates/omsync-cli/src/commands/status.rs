use std::path::PathBuf;

use omsync_core::util::unix_timestamp_millis_now;
use serde::Serialize;

use crate::auth::resolve_token;
use crate::commands::common::{
    describe_last_sync, display_vault_root, format_sync_timestamp, resolve_vault_root,
    settings_for_profile, url_override, ProfileContext,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusItem {
    pub profile: String,
    pub url: Option<String>,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    pub vault: String,
    pub notes_folder: String,
    pub attachments_folder: String,
    pub last_sync: i64,
    pub has_token: bool,
    pub missing: Vec<String>,
}

pub fn run_status(
    global_profile: Option<&str>,
    vault: Option<PathBuf>,
    as_json: bool,
) -> Result<(), CliError> {
    let context = ProfileContext::load(global_profile)?;
    let profile = context.profile();
    let token = resolve_token(&context.name)?;
    let has_token = token.is_some();
    let settings = settings_for_profile(&profile, token, url_override());
    let vault_root = resolve_vault_root(vault)?;

    let item = StatusItem {
        profile: context.name.clone(),
        url: (!settings.url.is_empty()).then(|| settings.url.clone()),
        user_name: profile.user_name.clone(),
        user_id: profile.user_id(),
        vault: display_vault_root(&vault_root),
        notes_folder: settings.notes_folder.clone(),
        attachments_folder: settings.attachments_folder.clone(),
        last_sync: settings.last_sync,
        has_token,
        missing: settings
            .missing_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    for line in format_status_lines(&item, unix_timestamp_millis_now()) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_status_lines(item: &StatusItem, now_ms: i64) -> Vec<String> {
    let mut lines = vec![
        format!("Profile: {}", item.profile),
        format!("URL: {}", item.url.as_deref().unwrap_or("(not set)")),
        format!(
            "User: {}",
            match (&item.user_name, &item.user_id) {
                (Some(name), Some(id)) => format!("{name} ({id})"),
                (Some(name), None) => format!("{name} (unresolved)"),
                (None, _) => "(not set)".to_string(),
            }
        ),
        format!("Vault: {}", item.vault),
        format!("Notes folder: {}", item.notes_folder),
        format!("Attachments folder: {}", item.attachments_folder),
        format!(
            "Token: {}",
            if item.has_token { "stored" } else { "missing" }
        ),
    ];

    let mut last_sync = describe_last_sync(item.last_sync, now_ms);
    if item.last_sync > 0 {
        last_sync.push_str(&format!(" ({})", format_sync_timestamp(item.last_sync)));
    }
    lines.push(last_sync);

    if !item.missing.is_empty() {
        lines.push(format!("Missing: {}", item.missing.join(", ")));
    }
    lines
}
