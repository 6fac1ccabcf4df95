//! CLI error type and exit codes.

use std::process::ExitCode;

use parish_client::{ClientError, ConfigError, ErrorKind, Screen};
use parish_core::Role;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not logged in. Run `parish login` first.")]
    NotLoggedIn,

    #[error("Access denied: {what} is not available to the {role} role")]
    AccessDenied { what: String, role: Role },

    #[error("{0}")]
    Invalid(String),
}

impl CliError {
    /// Access denied for a screen.
    pub fn screen_denied(screen: Screen, role: Role) -> Self {
        Self::AccessDenied {
            what: screen.title().to_string(),
            role,
        }
    }

    /// Message shown on stderr.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            _ => self.to_string(),
        }
    }

    /// `1` general failure, `2` sign-in needed, `3` not permitted.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotLoggedIn => ExitCode::from(2),
            Self::AccessDenied { .. } => ExitCode::from(3),
            Self::Client(e) => match e.kind() {
                ErrorKind::Authentication | ErrorKind::Authorization => ExitCode::from(2),
                ErrorKind::Forbidden => ExitCode::from(3),
                _ => ExitCode::FAILURE,
            },
            _ => ExitCode::FAILURE,
        }
    }
}
