use crate::auth::{TokenStore, TOKEN_ENV};
use crate::cli::AuthCommands;
use crate::commands::common::ProfileContext;
use crate::error::CliError;

pub fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let context = ProfileContext::load(global_profile)?;
    let profile_name = context.name.as_str();
    let store = TokenStore::new(profile_name);

    match command {
        AuthCommands::Login { token } => {
            store.save(&token)?;
            println!("Stored access token for profile '{profile_name}'");
            if !context.is_configured() {
                println!(
                    "Profile '{profile_name}' is not configured yet. Run `omsync config init --url <url> --user-name <name>`."
                );
            }
            Ok(())
        }
        AuthCommands::Status => {
            if store.load()?.is_some() {
                println!("Profile '{profile_name}' has a stored access token.");
            } else {
                println!("Profile '{profile_name}' has no stored access token.");
            }
            if std::env::var_os(TOKEN_ENV).is_some() {
                println!("{TOKEN_ENV} is set and overrides the stored token.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            store.clear()?;
            println!("Removed access token for profile '{profile_name}'");
            Ok(())
        }
    }
}
