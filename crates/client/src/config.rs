//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PARISH_API_BASE_URL` - Base URL of the parish backend (e.g. `https://parish.example.org/api/`)
//!
//! ## Optional
//! - `PARISH_SESSION_FILE` - Where the session is persisted
//!   (default: `parish/session.json` under the platform config directory)
//! - `PARISH_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_FILE_NAME: &str = "session.json";
const APP_DIR: &str = "parish";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Cannot determine a session file location; set PARISH_SESSION_FILE")]
    NoSessionLocation,
}

/// Parish client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// Session persistence file
    pub session_file: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration from explicit values, using the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("PARISH_API_BASE_URL", base_url)?,
            session_file: session_file.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or invalid, if the
    /// timeout is not a whole number of seconds, or if no session location
    /// can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None, None)
    }

    /// Load configuration from environment variables, with explicit values
    /// (e.g. command-line flags) taking precedence.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn resolve(
        base_url: Option<&str>,
        session_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = match base_url {
            Some(url) => parse_base_url("PARISH_API_BASE_URL", url)?,
            None => parse_base_url(
                "PARISH_API_BASE_URL",
                &get_required_env("PARISH_API_BASE_URL")?,
            )?,
        };

        let session_file = match session_file.or_else(|| {
            get_optional_env("PARISH_SESSION_FILE").map(PathBuf::from)
        }) {
            Some(path) => path,
            None => default_session_file(dirs::config_dir())
                .ok_or(ConfigError::NoSessionLocation)?,
        };

        let timeout_secs = get_env_or_default(
            "PARISH_HTTP_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("PARISH_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            session_file,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Replace the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse a base URL and normalize it to end with `/`.
///
/// `Url::join` drops the last path segment unless it ends in a slash, so
/// `https://host/api` would otherwise resolve `members/` to `https://host/members/`.
fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(var.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Default session file under `config_dir`, normally [`dirs::config_dir`]
/// (`~/.config` on Linux, `~/Library/Application Support` on macOS,
/// `%APPDATA%` on Windows).
fn default_session_file(config_dir: Option<PathBuf>) -> Option<PathBuf> {
    config_dir.map(|dir| dir.join(APP_DIR).join(SESSION_FILE_NAME))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let url = parse_base_url("X", "https://parish.example.org/api").unwrap();
        assert_eq!(url.as_str(), "https://parish.example.org/api/");
        assert_eq!(
            url.join("members/").unwrap().as_str(),
            "https://parish.example.org/api/members/"
        );
    }

    #[test]
    fn test_base_url_root() {
        let url = parse_base_url("X", "http://127.0.0.1:5000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        let err = parse_base_url("PARISH_API_BASE_URL", "ftp://parish.example.org").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(var, _) if var == "PARISH_API_BASE_URL"));
        assert!(parse_base_url("X", "not a url").is_err());
    }

    #[test]
    fn test_default_session_file_under_platform_config_dir() {
        let path = default_session_file(dirs::config_dir());
        assert_eq!(
            path,
            dirs::config_dir().map(|d| d.join("parish").join("session.json"))
        );

        let path = default_session_file(Some(PathBuf::from("/cfg"))).unwrap();
        assert_eq!(path, PathBuf::from("/cfg/parish/session.json"));
        assert!(default_session_file(None).is_none());
    }

    #[test]
    fn test_explicit_session_file_wins() {
        let config = ClientConfig::resolve(
            Some("https://parish.example.org"),
            Some(PathBuf::from("/srv/parish/session.json")),
        )
        .unwrap();
        assert_eq!(config.session_file, PathBuf::from("/srv/parish/session.json"));
        assert_eq!(config.base_url.as_str(), "https://parish.example.org/");
    }

    #[test]
    fn test_new_uses_default_timeout() {
        let config = ClientConfig::new("https://parish.example.org", "/tmp/s.json").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
