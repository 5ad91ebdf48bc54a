use std::path::{Path, PathBuf};

use omsync_core::api::MemosClient;
use omsync_core::config::SyncConfig;
use omsync_core::storage::VaultStore;
use omsync_core::sync::{
    PaginationPolicy, SyncOrchestrator, SyncReport, Watermark, WatermarkPolicy,
};
use tracing::debug;

use crate::auth::resolve_token;
use crate::commands::common::{
    display_vault_root, resolve_vault_root, settings_for_profile, url_override, ProfileContext,
};
use crate::config_profiles::default_config_path;
use crate::error::CliError;
use crate::lock::{default_lock_dir, SyncLock};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub hold_watermark_on_failure: bool,
    pub all_pages: bool,
}

impl SyncOptions {
    pub const fn watermark_policy(self) -> WatermarkPolicy {
        if self.hold_watermark_on_failure {
            WatermarkPolicy::HoldOnFailure
        } else {
            WatermarkPolicy::AlwaysAdvance
        }
    }

    pub const fn pagination_policy(self) -> PaginationPolicy {
        if self.all_pages {
            PaginationPolicy::StopOnEmptyToken
        } else {
            PaginationPolicy::StopOnFirstEmptyPage
        }
    }
}

pub async fn run_sync(
    global_profile: Option<&str>,
    vault: Option<PathBuf>,
    options: SyncOptions,
) -> Result<(), CliError> {
    let config_path = default_config_path().map_err(CliError::Config)?;
    let (lock, context) = lock_profile(&config_path, &default_lock_dir()?, global_profile)?;
    let profile_name = context.name.clone();
    let token = resolve_token(&profile_name)?;
    let settings = settings_for_profile(&context.profile(), token, url_override());

    let missing = settings.missing_fields();
    if !missing.is_empty() {
        return Err(CliError::SyncNotConfigured {
            profile: profile_name,
            missing: missing.join(", "),
        });
    }

    let vault_root = resolve_vault_root(vault)?;
    let config = SyncConfig::from_settings(&settings, &vault_root)?;
    let client = MemosClient::from_config(&config)?;
    let store = VaultStore::new();
    debug!(
        profile = %profile_name,
        vault = %display_vault_root(&vault_root),
        lock = %lock.path().display(),
        "Resolved sync target"
    );

    println!("Started syncing...");
    let report = SyncOrchestrator::new(
        &client,
        &store,
        &config,
        Watermark::from_millis(settings.last_sync),
    )
    .with_pagination_policy(options.pagination_policy())
    .with_watermark_policy(options.watermark_policy())
    .run()
    .await;

    persist_watermark(&profile_name, report.watermark)?;
    for line in format_report_lines(&report) {
        println!("{line}");
    }

    drop(lock);
    match failed_phases(&report) {
        0 => Ok(()),
        failed => Err(CliError::SyncFailed(failed)),
    }
}

/// Take the profile lock, then read the profile. The watermark is only read
/// under the lock so a run never starts from a value an earlier run replaced.
pub fn lock_profile(
    config_path: &Path,
    lock_dir: &Path,
    explicit: Option<&str>,
) -> Result<(SyncLock, ProfileContext), CliError> {
    let profile_name = ProfileContext::load_from_path(config_path, explicit)?.name;
    let lock = SyncLock::acquire(lock_dir, &profile_name)?;
    let context = ProfileContext::load_from_path(config_path, Some(&profile_name))?;
    Ok((lock, context))
}

/// Reload before writing so edits made while the sync ran are kept.
fn persist_watermark(profile_name: &str, watermark: Watermark) -> Result<(), CliError> {
    let mut context = ProfileContext::load(Some(profile_name))?;
    let profile = context.config.profile_mut_or_default(profile_name);
    profile.last_sync = watermark.as_millis();
    context.config.save().map_err(CliError::Config)?;
    Ok(())
}

pub fn failed_phases(report: &SyncReport) -> usize {
    [&report.notes.outcome, &report.attachments.outcome]
        .into_iter()
        .filter(|outcome| outcome.is_failed())
        .count()
}

pub fn format_report_lines(report: &SyncReport) -> Vec<String> {
    let mut lines = vec![report.notes.to_string(), report.attachments.to_string()];
    lines.extend(report.warnings().map(|warning| format!("warning: {warning}")));
    lines.push(if report.has_failures() {
        "Sync finished with failures".to_string()
    } else {
        "Synced successfully".to_string()
    });
    lines
}
