//! The process-wide session owner.

use std::future::Future;
use std::io;
use std::sync::Arc;

use parish_core::{Email, UserRecord};
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::{MemorySessionStore, Session, SessionStore, StoreError};
use crate::error::ClientError;

/// Exchanges credentials for a session.
pub trait Authenticator: Send + Sync {
    /// Authenticate `email`/`password` against the backend.
    fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<Session, ClientError>> + Send;
}

/// Token as seen by an outgoing request, tagged with the session generation
/// it was read from.
pub(crate) struct BearerSnapshot {
    pub token: Option<SecretString>,
    pub epoch: u64,
}

#[derive(Default)]
struct SessionState {
    current: Option<Session>,
    /// Bumped every time the session is established or cleared.
    epoch: u64,
}

struct SessionInner {
    state: RwLock<SessionState>,
    store: Arc<dyn SessionStore>,
}

/// Owns the current session and keeps the store in step with it.
///
/// Cloning is cheap; every clone shares one session. Login, logout and
/// invalidation take the write lock for the whole store update so readers
/// never observe a token without its user or a session that disagrees with
/// the store. Store calls run on the blocking pool, since the file store
/// does synchronous disk I/O.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// Manager backed by `store`. Starts empty; call [`Self::restore`] to
    /// pick up a previously saved session.
    pub fn new(store: impl SessionStore) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(SessionState::default()),
                store: Arc::new(store),
            }),
        }
    }

    /// Manager with a throwaway in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// Load the persisted session into memory.
    ///
    /// A missing, unreadable, or malformed record leaves the manager
    /// unauthenticated and removes the bad record. Never fails.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Option<UserRecord> {
        let mut state = self.inner.state.write().await;

        match self.run_store(|store| store.load()).await {
            Ok(Some(session)) => {
                let user = session.user().clone();
                info!(user_id = %user.id, role = %user.role, "Restored session");
                state.current = Some(session);
                state.epoch += 1;
                Some(user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                if let Err(e) = self.run_store(|store| store.clear()).await {
                    warn!(error = %e, "Failed to remove unreadable session");
                }
                state.current = None;
                None
            }
        }
    }

    /// Authenticate and, on success, persist and install the new session.
    ///
    /// On failure the previous session (if any) is left as it was.
    ///
    /// # Errors
    ///
    /// Returns whatever the authenticator returns, or `ClientError::Storage`
    /// if the session cannot be persisted.
    #[instrument(skip(self, authenticator, email, password), fields(email = %email))]
    pub async fn login<A: Authenticator>(
        &self,
        authenticator: &A,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserRecord, ClientError> {
        let session = authenticator.authenticate(email, password).await?;
        let user = session.user().clone();
        self.establish(session).await?;
        info!(user_id = %user.id, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Persist and install `session`, replacing any current one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store write fails; memory is untouched then.
    pub async fn establish(&self, session: Session) -> Result<(), StoreError> {
        let mut state = self.inner.state.write().await;
        let saved = session.clone();
        self.run_store(move |store| store.save(&saved)).await?;
        state.current = Some(session);
        state.epoch += 1;
        Ok(())
    }

    /// Swap the user record while keeping the token (after profile linking).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` if there is no session, or
    /// `ClientError::Storage` if the store write fails.
    pub async fn replace_user(&self, user: UserRecord) -> Result<(), ClientError> {
        let mut state = self.inner.state.write().await;
        let session = state
            .current
            .clone()
            .ok_or(ClientError::NotAuthenticated)?
            .with_user(user);
        let saved = session.clone();
        self.run_store(move |store| store.save(&saved)).await?;
        state.current = Some(session);
        Ok(())
    }

    /// Clear the session from memory and the store.
    ///
    /// Memory is always cleared, even when the store removal fails. Calling
    /// this without a session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the persisted record could not be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut state = self.inner.state.write().await;
        let result = self.run_store(|store| store.clear()).await;
        if let Some(session) = state.current.take() {
            state.epoch += 1;
            info!(user_id = %session.user().id, "Logged out");
        }
        result
    }

    /// The authenticated user, if any.
    pub async fn current_user(&self) -> Option<UserRecord> {
        self.inner
            .state
            .read()
            .await
            .current
            .as_ref()
            .map(|s| s.user().clone())
    }

    /// Whether a session is installed.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.current.is_some()
    }

    /// Current token and generation, read atomically.
    pub(crate) async fn bearer(&self) -> BearerSnapshot {
        let state = self.inner.state.read().await;
        BearerSnapshot {
            token: state.current.as_ref().map(|s| s.token().clone()),
            epoch: state.epoch,
        }
    }

    /// Clear the session if it is still the one a rejected request used.
    ///
    /// Returns `true` only for the call that actually cleared it, so a burst
    /// of 401s on one token produces exactly one invalidation.
    pub(crate) async fn invalidate(&self, epoch: u64) -> bool {
        let mut state = self.inner.state.write().await;
        if state.epoch != epoch || state.current.is_none() {
            return false;
        }

        if let Err(e) = self.run_store(|store| store.clear()).await {
            warn!(error = %e, "Failed to remove rejected session from store");
        }
        state.current = None;
        state.epoch += 1;
        warn!("Session rejected by server, cleared");
        true
    }

    /// Run a store operation on the blocking pool.
    async fn run_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SessionStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.inner.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| StoreError::Io(io::Error::other(e)))?
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}
