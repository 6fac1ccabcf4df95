//! Authenticated session state and its persistence.
//!
//! A [`Session`] pairs a bearer token with the user it was issued for; the two
//! are only ever stored, replaced, and cleared together. [`SessionManager`]
//! is the single owner of the in-memory copy and of the [`SessionStore`]
//! that persists it across restarts.

mod manager;
mod store;

pub use manager::{Authenticator, SessionManager};
pub(crate) use manager::BearerSnapshot;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};

use parish_core::UserRecord;
use secrecy::SecretString;

/// A bearer token and the user it belongs to.
///
/// `Debug` output never contains the token.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    user: UserRecord,
}

impl Session {
    /// Pair a token with its user.
    #[must_use]
    pub const fn new(token: SecretString, user: UserRecord) -> Self {
        Self { token, user }
    }

    /// The authenticated user.
    #[must_use]
    pub const fn user(&self) -> &UserRecord {
        &self.user
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// Same token, refreshed user record.
    #[must_use]
    pub(crate) fn with_user(self, user: UserRecord) -> Self {
        Self {
            token: self.token,
            user,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures {
    use parish_core::{Email, MemberId, Role, UserId, UserRecord};
    use secrecy::SecretString;

    use super::Session;

    pub fn user(id: i32, role: Role) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            name: format!("User {id}"),
            email: Email::parse(&format!("user{id}@parish.test")).unwrap(),
            role,
            member_id: (role == Role::Member).then(|| MemberId::new(id)),
        }
    }

    pub fn session(id: i32, role: Role) -> Session {
        Session::new(SecretString::from(format!("token-{id}")), user(id, role))
    }
}
