//! omsync CLI - mirror a Memos account into a markdown vault
//!
//! Pulls memos and attachments created since the last sync into plain files.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
mod lock;


use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::status::run_status;
use crate::commands::sync::{run_sync, SyncOptions};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let profile = cli.profile.as_deref();
    match cli.command {
        Some(Commands::Sync {
            hold_watermark_on_failure,
            all_pages,
        }) => {
            let options = SyncOptions {
                hold_watermark_on_failure,
                all_pages,
            };
            run_sync(profile, cli.vault, options).await?;
        }
        Some(Commands::Status { json }) => run_status(profile, cli.vault, json)?,
        Some(Commands::Config { command }) => run_config(command, profile).await?,
        Some(Commands::Auth { command }) => run_auth(command, profile)?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let directive = if verbose { "omsync=debug" } else { "omsync=info" };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = directive.parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
