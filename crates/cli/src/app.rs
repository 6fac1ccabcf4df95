//! Configuration and client start-up for commands.

use std::path::PathBuf;

use parish_client::{ClientConfig, GuardOutcome, ParishClient, Screen};
use parish_core::UserRecord;

use crate::error::CliError;

/// Resolve configuration; flags (already merged with env by clap) win.
pub fn load_config(
    api_url: Option<&str>,
    session_file: Option<PathBuf>,
) -> Result<ClientConfig, CliError> {
    Ok(ClientConfig::resolve(api_url, session_file)?)
}

/// Start a client with the saved session.
pub async fn connect(config: &ClientConfig) -> Result<ParishClient, CliError> {
    Ok(ParishClient::start(config).await?)
}

/// Enter `screen` through the route guard, returning the signed-in user.
pub async fn enter(client: &ParishClient, screen: Screen) -> Result<UserRecord, CliError> {
    match client.guard().enter(screen).await {
        GuardOutcome::Render { user: Some(user) } => Ok(user),
        GuardOutcome::Render { user: None } | GuardOutcome::RedirectToLogin => {
            Err(CliError::NotLoggedIn)
        }
        GuardOutcome::AccessDenied { screen, role } => Err(CliError::screen_denied(screen, role)),
    }
}
