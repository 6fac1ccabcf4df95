//! Wiring of session, navigator, gateway, and guard into one handle.

use tracing::info;

use crate::auth::AuthApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::guard::RouteGuard;
use crate::navigator::{Navigator, Screen};
use crate::resources::{Resource, ResourceClient, ResourcePage};
use crate::session::{FileSessionStore, SessionManager, SessionStore};

/// Everything a front-end needs, sharing one session.
#[derive(Debug, Clone)]
pub struct ParishClient {
    gateway: Gateway,
    auth: AuthApi,
    guard: RouteGuard,
}

impl ParishClient {
    /// Start with the session persisted at `config.session_file`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub async fn start(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_store(config, FileSessionStore::new(&config.session_file)).await
    }

    /// Start with an explicit session store.
    ///
    /// A restored session opens on the home screen, otherwise on login.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub async fn with_store(
        config: &ClientConfig,
        store: impl SessionStore,
    ) -> Result<Self, ClientError> {
        let session = SessionManager::new(store);
        let initial = match session.restore().await {
            Some(user) => {
                info!(user_id = %user.id, "Resuming session");
                Screen::Home
            }
            None => Screen::Login,
        };
        let navigator = Navigator::new(initial);
        let gateway = Gateway::new(config, session.clone(), navigator.clone())?;

        Ok(Self {
            auth: AuthApi::new(gateway.clone()),
            guard: RouteGuard::new(session, navigator),
            gateway,
        })
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthApi {
        &self.auth
    }

    #[must_use]
    pub const fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    #[must_use]
    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        self.gateway.session()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        self.gateway.navigator()
    }

    /// Request client for `R`.
    #[must_use]
    pub fn resource<R: Resource>(&self) -> ResourceClient<R> {
        ResourceClient::new(self.gateway.clone())
    }

    /// Fresh list page for `R`.
    #[must_use]
    pub fn page<R: Resource>(&self) -> ResourcePage<R> {
        ResourcePage::new(self.gateway.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, fixtures};
    use parish_core::Role;

    fn config() -> ClientConfig {
        ClientConfig::new("http://127.0.0.1:9", "/dev/null").unwrap()
    }

    #[tokio::test]
    async fn test_starts_on_login_without_session() {
        let client = ParishClient::with_store(&config(), MemorySessionStore::new())
            .await
            .unwrap();
        assert_eq!(client.navigator().current(), Screen::Login);
        assert!(client.session().current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_resumes_saved_session() {
        let store = MemorySessionStore::with_session(fixtures::session(4, Role::Member));
        let client = ParishClient::with_store(&config(), store).await.unwrap();

        assert_eq!(client.navigator().current(), Screen::Home);
        assert_eq!(
            client.session().current_user().await.unwrap().role,
            Role::Member
        );
    }
}
