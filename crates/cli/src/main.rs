//! Parish CLI - manage parish records from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from PARISH_PASSWORD or prompted on stdin)
//! parish login -e admin@parish.org
//!
//! # List members (admin only)
//! parish members list
//!
//! # Record a donation
//! parish donations add --amount 25.00 --type offering --date 2025-03-02
//!
//! # Link your account to your member record
//! parish link ABC123
//!
//! # Sign out
//! parish logout
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` / `status` - Session management
//! - `register` / `link` - Account creation and profile linking
//! - `members`, `events`, `donations`, `sacraments`, `districts`,
//!   `announcements`, `attendance` - Record management

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use parish_core::Email;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod error;
mod prompt;
mod render;

use commands::resources::{
    AnnouncementAction, AttendanceAction, DistrictAction, DonationAction, EventAction,
    MemberAction, SacramentAction,
};

#[derive(Parser)]
#[command(name = "parish")]
#[command(author, version, about = "Parish management from the terminal")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "PARISH_API_BASE_URL", global = true)]
    api_url: Option<String>,

    /// Session file location
    #[arg(long, env = "PARISH_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        /// Account email
        #[arg(short, long)]
        email: Email,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "PARISH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in account as the server sees it
    Whoami,
    /// Show the saved session without contacting the server
    Status,
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: Email,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "PARISH_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Claim code linking the account to an existing member record
        #[arg(long)]
        claim_code: Option<String>,
    },
    /// Link your account to your member record
    Link {
        /// Claim code from the parish office
        claim_code: String,
    },
    /// Parish members (admin only)
    Members {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Parish events
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Donations
    Donations {
        #[command(subcommand)]
        action: DonationAction,
    },
    /// Sacramental records
    Sacraments {
        #[command(subcommand)]
        action: SacramentAction,
    },
    /// Districts (admin only)
    Districts {
        #[command(subcommand)]
        action: DistrictAction,
    },
    /// Announcements (publishing is admin only)
    Announcements {
        #[command(subcommand)]
        action: AnnouncementAction,
    },
    /// Event attendance
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads PARISH_* variables (ignore errors if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            render::error(&e);
            e.exit_code()
        }
    }
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,parish_cli=info".into());

    let json = std::env::var("PARISH_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), error::CliError> {
    let config = app::load_config(cli.api_url.as_deref(), cli.session_file)?;

    // `status` reads the saved session only.
    if matches!(cli.command, Commands::Status) {
        return commands::auth::status(&config).await;
    }

    let client = app::connect(&config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&client, &email, password).await
        }
        Commands::Logout => commands::auth::logout(&client).await,
        Commands::Whoami => commands::auth::whoami(&client).await,
        Commands::Status => Ok(()),
        Commands::Register {
            name,
            email,
            password,
            claim_code,
        } => commands::auth::register(&client, name, email, password, claim_code).await,
        Commands::Link { claim_code } => commands::auth::link(&client, &claim_code).await,
        Commands::Members { action } => commands::resources::run(&client, action.into()).await,
        Commands::Events { action } => commands::resources::run(&client, action.into()).await,
        Commands::Donations { action } => commands::resources::run(&client, action.into()).await,
        Commands::Sacraments { action } => {
            commands::resources::run(&client, action.into()).await
        }
        Commands::Districts { action } => commands::resources::run(&client, action.into()).await,
        Commands::Announcements { action } => {
            commands::resources::run(&client, action.into()).await
        }
        Commands::Attendance { action } => {
            commands::resources::run(&client, action.into()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resource_command() {
        let cli = Cli::try_parse_from([
            "parish",
            "--api-url",
            "http://localhost:5000",
            "events",
            "remove",
            "3",
            "--yes",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_login_requires_valid_email() {
        let cli = Cli::try_parse_from(["parish", "login", "-e", "not-an-email"]);
        assert!(cli.is_err());
    }
}
