use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "omsync")]
#[command(about = "Mirror memos and attachments from a Memos account into a markdown vault")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault root that the notes and attachments folders live under
    #[arg(long, global = true, value_name = "PATH")]
    pub vault: Option<PathBuf>,

    /// CLI profile name
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull memos and attachments created since the last sync
    Sync {
        /// Keep the previous watermark when a phase fails so the next run retries it
        #[arg(long)]
        hold_watermark_on_failure: bool,
        /// Read every memo page instead of stopping at the first page with nothing new
        #[arg(long)]
        all_pages: bool,
    },
    /// Show profile configuration and last sync time
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage the Memos access token for a profile
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Memos instance URL (e.g. <https://memos.example.tld>)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        /// Username of the account that owns the token
        #[arg(long, value_name = "NAME")]
        user_name: Option<String>,
        /// Vault folder where memos are saved
        #[arg(long, value_name = "FOLDER")]
        notes_folder: Option<String>,
        /// Vault folder where attachments are saved
        #[arg(long, value_name = "FOLDER")]
        attachments_folder: Option<String>,
        /// Forget the last sync time so the next sync pulls everything again
        #[arg(long)]
        reset_last_sync: bool,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store a Memos access token in the system keychain
    Login {
        /// Access token generated in the Memos settings
        #[arg(long, value_name = "TOKEN")]
        token: String,
    },
    /// Show whether a token is stored for the profile
    Status,
    /// Remove the stored token
    Logout,
}
