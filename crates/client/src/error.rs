//! Client error taxonomy.
//!
//! Every failure the client can observe lands in exactly one [`ErrorKind`].
//! Only [`ErrorKind::Authorization`] escalates to global state (the gateway
//! clears the session and redirects to login before the error is returned);
//! every other kind stays with the screen that caused it.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::session::StoreError;

/// Errors returned by the parish client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login was rejected. Deliberately does not say which field was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The server rejected the session token; the session has been cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// The operation needs a session and there is none.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The server (or a route guard) refused the operation for this role.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the submitted input.
    #[error("{message}")]
    Validation {
        /// HTTP status of the rejection.
        status: u16,
        /// The server's `error` message.
        message: String,
    },

    /// The server failed to handle the request.
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status of the failure.
        status: u16,
        /// The server's message, if any.
        message: String,
    },

    /// Connection refused, timeout, TLS failure and the like.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response did not match the expected record shape.
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// The persisted session could not be written or removed.
    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid request path: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification used to decide how an error is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong credentials; shown inline on the login screen.
    Authentication,
    /// Missing or rejected session; the user is sent to login.
    Authorization,
    /// Role not allowed; shown as access denied.
    Forbidden,
    /// Input rejected by the backend; shown inline on the form.
    Validation,
    /// Record does not exist.
    NotFound,
    /// Backend unreachable; the user is asked to retry.
    Network,
    /// Anything else (server failures, malformed responses, local storage).
    Internal,
}

impl ClientError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::SessionExpired | Self::NotAuthenticated => ErrorKind::Authorization,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } | Self::Decode(_) | Self::Storage(_) | Self::Url(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message suitable for showing to the person at the keyboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Could not reach the parish server. Check your connection and try again."
                    .to_string()
            }
            Self::SessionExpired | Self::NotAuthenticated => {
                format!("{self}. Run `parish login` to sign in.")
            }
            Self::Server { .. } | Self::Decode(_) => {
                "The parish server returned an unexpected response. Please try again later."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Map a non-success, non-401 response to an error.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = ApiErrorBody::message_from(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        match status {
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Validation {
                status: s.as_u16(),
                message,
            },
        }
    }
}

/// Error body returned by the backend on 4xx/5xx: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiErrorBody {
    fn message_from(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        parsed
            .error
            .or(parsed.message)
            .filter(|m| !m.trim().is_empty())
    }
}
