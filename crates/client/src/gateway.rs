//! Authenticated HTTP gateway to the parish backend.
//!
//! Every backend call goes through [`Gateway`]. It attaches the current
//! session's bearer token, turns non-success responses into [`ClientError`]s,
//! and handles the one cross-cutting failure: when the backend rejects the
//! token with 401, the session is cleared and the navigator is sent to login
//! before the error reaches the caller.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::navigator::Navigator;
use crate::session::SessionManager;

/// Whether a request carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Attach the bearer token; a 401 invalidates the session.
    Session,
    /// Send without a token; a 401 is an ordinary failure (login, register).
    Anonymous,
}

/// HTTP gateway to the parish backend.
///
/// Cloning is cheap and shares the HTTP connection pool, the session, and
/// the navigator.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionManager,
    navigator: Navigator,
}

impl Gateway {
    /// Create a gateway for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        session: SessionManager,
        navigator: Navigator,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("parish-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                http,
                base_url: config.base_url.clone(),
                session,
                navigator,
            }),
        })
    }

    /// The session this gateway authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// The navigator redirected on session rejection.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Authenticated requests
    // =========================================================================

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`ClientError`]; a rejected token yields `SessionExpired` after
    /// the session has been cleared.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.execute(Method::GET, path, None, Auth::Session).await?;
        decode(&body)
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self
            .execute(Method::POST, path, Some(payload), Auth::Session)
            .await?;
        decode(&body)
    }

    /// `PUT path` with a JSON body. The response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        self.execute(Method::PUT, path, Some(payload), Auth::Session)
            .await?;
        Ok(())
    }

    /// `DELETE path`. The response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, path, None, Auth::Session)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Anonymous requests
    // =========================================================================

    /// `POST path` without a token. A 401 here never touches the session.
    pub(crate) async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self
            .execute(Method::POST, path, Some(payload), Auth::Anonymous)
            .await?;
        decode(&body)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    #[instrument(skip(self, method, body), fields(method = %method))]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        let mut request = self.inner.http.request(method, url);

        // Generation of the session whose token went out with this request.
        let mut sent_under = None;
        if auth == Auth::Session {
            let bearer = self.inner.session.bearer().await;
            if let Some(token) = bearer.token {
                request = request.bearer_auth(token.expose_secret());
                sent_under = Some(bearer.epoch);
            }
        }

        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Response received");

        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Session {
            return Err(self.session_rejected(sent_under).await);
        }

        Err(ClientError::from_status(status, &text))
    }

    /// Handle a 401 on an authenticated request.
    ///
    /// Only the first rejection of a given session clears it and redirects;
    /// later ones (same burst, or a stale request after re-login) just report.
    async fn session_rejected(&self, sent_under: Option<u64>) -> ClientError {
        match sent_under {
            Some(epoch) => {
                if self.inner.session.invalidate(epoch).await {
                    self.inner.navigator.redirect_to_login();
                }
                ClientError::SessionExpired
            }
            None => {
                self.inner.navigator.redirect_to_login();
                ClientError::NotAuthenticated
            }
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Decode a success body. An empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigator::Screen;
    use crate::session::fixtures;
    use parish_core::Role;

    fn gateway_at(base: &str) -> Gateway {
        let config = ClientConfig::new(base, "/dev/null").unwrap();
        Gateway::new(&config, SessionManager::in_memory(), Navigator::new(Screen::Home)).unwrap()
    }

    #[test]
    fn test_decode_empty_body_as_unit_like() {
        let value: Option<serde_json::Value> = decode(b"").unwrap();
        assert!(value.is_none());
        let value: serde_json::Value = decode(br#"{"message": "ok"}"#).unwrap();
        assert_eq!(value["message"], "ok");
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let err = decode::<Vec<u32>>(br#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_keeps_session() {
        // Port 9 (discard) on localhost is closed on test machines.
        let gateway = gateway_at("http://127.0.0.1:9");
        gateway
            .session()
            .establish(fixtures::session(1, Role::Admin))
            .await
            .unwrap();

        let err = gateway
            .get::<serde_json::Value>("members/")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert!(gateway.session().is_authenticated().await);
        assert_eq!(gateway.navigator().current(), Screen::Home);
        assert_eq!(gateway.navigator().login_redirects(), 0);
    }

    #[tokio::test]
    async fn test_rejection_without_token_redirects() {
        let gateway = gateway_at("http://127.0.0.1:9");
        let err = gateway.session_rejected(None).await;
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(gateway.navigator().current(), Screen::Login);
    }

    #[tokio::test]
    async fn test_stale_rejection_leaves_new_session() {
        let gateway = gateway_at("http://127.0.0.1:9");
        gateway
            .session()
            .establish(fixtures::session(1, Role::Member))
            .await
            .unwrap();
        let stale = gateway.session().bearer().await.epoch;
        gateway
            .session()
            .establish(fixtures::session(2, Role::Member))
            .await
            .unwrap();

        let err = gateway.session_rejected(Some(stale)).await;

        assert!(matches!(err, ClientError::SessionExpired));
        assert!(gateway.session().is_authenticated().await);
        assert_eq!(gateway.navigator().current(), Screen::Home);
    }
}
