use omsync_core::api::{resolve_account, MemosClient};
use omsync_core::config::normalize_base_url;
use omsync_core::util::normalize_text_option;
use tracing::info;

use crate::auth::resolve_token;
use crate::cli::ConfigCommands;
use crate::commands::common::{settings_for_profile, url_override, ProfileContext};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

pub async fn run_config(
    command: ConfigCommands,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            url,
            user_name,
            notes_folder,
            attachments_folder,
            reset_last_sync,
            no_activate,
        } => {
            let update = ProfileUpdate {
                url: url.or_else(url_override),
                user_name,
                notes_folder,
                attachments_folder,
                reset_last_sync,
            };
            run_config_init(global_profile, update, no_activate).await
        }
    }
}

/// Values passed to `config init`; `None` keeps what the profile has.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub url: Option<String>,
    pub user_name: Option<String>,
    pub notes_folder: Option<String>,
    pub attachments_folder: Option<String>,
    pub reset_last_sync: bool,
}

pub async fn run_config_init(
    profile_name: Option<&str>,
    update: ProfileUpdate,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut context = ProfileContext::load(profile_name)?;
    let profile_name = context.name.clone();
    let existing = context.profile();

    let mut profile = merge_profile(&existing, update)?;
    if needs_account_resolution(&existing, &profile) {
        profile.user_id = Some(resolve_user_id(&profile_name, &profile).await?);
    }
    if reset_watermark_on_account_change(&existing, &mut profile) {
        info!(profile = %profile_name, "Account changed; resetting last sync");
    }

    *context.config.profile_mut_or_default(&profile_name) = profile;
    if !no_activate {
        context.config.active_profile = Some(profile_name.clone());
    }

    let path = context.config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let token = resolve_token(&profile_name)?;
    let settings = settings_for_profile(&context.profile(), token, None);
    let missing = settings.missing_fields();
    if missing.is_empty() {
        println!("Profile '{profile_name}' is ready. Run `omsync sync`.");
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing.join(", ")
        );
    }

    Ok(())
}

/// Apply explicit values over the stored profile, validating the URL.
pub fn merge_profile(existing: &CliProfile, update: ProfileUpdate) -> Result<CliProfile, CliError> {
    let mut profile = existing.clone();

    if let Some(url) = normalize_text_option(update.url) {
        profile.url = Some(normalize_base_url(&url)?);
    }
    if let Some(user_name) = normalize_text_option(update.user_name) {
        if profile.user_name.as_deref() != Some(user_name.as_str()) {
            profile.user_id = None;
        }
        profile.user_name = Some(user_name);
    }
    if let Some(folder) = normalize_text_option(update.notes_folder) {
        profile.notes_folder = Some(folder);
    }
    if let Some(folder) = normalize_text_option(update.attachments_folder) {
        profile.attachments_folder = Some(folder);
    }
    if update.reset_last_sync {
        profile.last_sync = 0;
    }

    Ok(profile)
}

/// The account is looked up again when the user name is new or the URL moved.
pub fn needs_account_resolution(existing: &CliProfile, profile: &CliProfile) -> bool {
    profile.user_name.is_some() && (profile.user_id.is_none() || profile.url != existing.url)
}

/// Same numeric id on another instance is still another account.
pub fn account_changed(existing: &CliProfile, profile: &CliProfile) -> bool {
    profile.url != existing.url || profile.user_id != existing.user_id
}

/// Clear `last_sync` when the profile now points at another account.
/// Returns whether a watermark was dropped.
pub fn reset_watermark_on_account_change(existing: &CliProfile, profile: &mut CliProfile) -> bool {
    if profile.last_sync > 0 && account_changed(existing, profile) {
        profile.last_sync = 0;
        true
    } else {
        false
    }
}

async fn resolve_user_id(profile_name: &str, profile: &CliProfile) -> Result<String, CliError> {
    let (Some(url), Some(user_name)) = (profile.url(), profile.user_name.as_deref()) else {
        return Err(CliError::Config(
            "A URL is required to look up the user name. Pass --url.".to_string(),
        ));
    };
    let token = resolve_token(profile_name)?.unwrap_or_default();
    let client = MemosClient::new(&url, token)?;
    let account = resolve_account(&client, user_name).await?;
    println!("Resolved user '{user_name}' to {account}");
    Ok(account)
}
