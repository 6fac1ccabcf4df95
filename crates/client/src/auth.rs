//! Account endpoints: login, registration, profile linking.

use parish_core::{Email, MemberId, UserId, UserRecord};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::navigator::Screen;
use crate::session::{Authenticator, Session};

const LOGIN_PATH: &str = "auth/login";
const REGISTER_PATH: &str = "auth/register";
const LINK_PATH: &str = "auth/link";
const ME_PATH: &str = "auth/me";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user: UserRecord,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    claim_code: Option<&'a str>,
}

#[derive(Serialize)]
struct LinkRequest<'a> {
    claim_code: &'a str,
}

/// A new account to create.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    /// Links the account to an existing member record on creation.
    pub claim_code: Option<String>,
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registered {
    pub user_id: UserId,
    #[serde(default)]
    pub member_id: Option<MemberId>,
}

/// Result of linking the account to a member record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The account was already linked; no request was made.
    AlreadyLinked(UserRecord),
    /// The claim code was accepted; the session now carries this user.
    Linked(UserRecord),
}

/// Client for the `auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    gateway: Gateway,
}

impl AuthApi {
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Log in and move to the home screen.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidCredentials` if the backend rejects the
    /// login, `ClientError::Network` if it is unreachable.
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserRecord, ClientError> {
        let user = self.gateway.session().login(self, email, password).await?;
        self.gateway.navigator().navigate(Screen::Home);
        Ok(user)
    }

    /// Log out and move to the login screen.
    ///
    /// The in-memory session is gone even if this returns an error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the persisted session could not be removed.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.gateway.session().logout().await;
        self.gateway.navigator().navigate(Screen::Login);
        result.map_err(ClientError::from)
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for duplicate emails, bad claim codes,
    /// or missing fields.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Registered, ClientError> {
        let request = RegisterRequest {
            name: registration.name.trim(),
            email: registration.email.as_str(),
            password: registration.password.expose_secret(),
            claim_code: registration
                .claim_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty()),
        };
        let registered: Registered = self
            .gateway
            .post_anonymous(REGISTER_PATH, &request)
            .await?;
        info!(user_id = %registered.user_id, "Account registered");
        Ok(registered)
    }

    /// Fetch the signed-in account from the backend.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::SessionExpired` if the token was rejected.
    pub async fn me(&self) -> Result<UserRecord, ClientError> {
        self.gateway.get(ME_PATH).await
    }

    /// Link the signed-in account to a member record using a claim code.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session,
    /// `ClientError::Validation` or `ClientError::NotFound` for a bad code.
    #[instrument(skip(self, claim_code))]
    pub async fn link_profile(&self, claim_code: &str) -> Result<LinkOutcome, ClientError> {
        let user = self
            .gateway
            .session()
            .current_user()
            .await
            .ok_or(ClientError::NotAuthenticated)?;

        if user.member_id.is_some() {
            return Ok(LinkOutcome::AlreadyLinked(user));
        }

        let request = LinkRequest {
            claim_code: claim_code.trim(),
        };
        let _: serde_json::Value = self.gateway.post(LINK_PATH, &request).await?;

        let refreshed = self.me().await.inspect_err(|e| {
            warn!(error = %e, "Linked, but refreshing the account failed");
        })?;
        self.gateway.session().replace_user(refreshed.clone()).await?;
        info!(user_id = %refreshed.id, "Account linked to member record");
        Ok(LinkOutcome::Linked(refreshed))
    }
}

impl Authenticator for AuthApi {
    /// Any non-success answer from the login endpoint is reported as
    /// invalid credentials; only transport and decode failures pass through.
    async fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, ClientError> {
        let request = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response: LoginResponse = self
            .gateway
            .post_anonymous(LOGIN_PATH, &request)
            .await
            .map_err(|e| match e {
                ClientError::Network(_) | ClientError::Decode(_) | ClientError::Url(_) => e,
                _ => ClientError::InvalidCredentials,
            })?;

        if response.access_token.trim().is_empty() {
            return Err(ClientError::InvalidCredentials);
        }

        Ok(Session::new(
            SecretString::from(response.access_token),
            response.user,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parish_core::Role;

    #[test]
    fn test_login_response_shape() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"access_token": "abc.def", "user": {"id": 1, "name": "Admin",
                "email": "admin@parish.test", "role": "admin"}}"#,
        )
        .unwrap();
        assert_eq!(response.access_token, "abc.def");
        assert_eq!(response.user.role, Role::Admin);
        assert!(response.user.member_id.is_none());
    }

    #[test]
    fn test_register_request_omits_blank_claim_code() {
        let request = RegisterRequest {
            name: "Ana",
            email: "ana@parish.test",
            password: "pw",
            claim_code: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"name": "Ana", "email": "ana@parish.test", "password": "pw"})
        );
    }

    #[test]
    fn test_registered_shape() {
        let registered: Registered =
            serde_json::from_str(r#"{"message": "User registered", "user_id": 9, "member_id": null}"#)
                .unwrap();
        assert_eq!(registered.user_id, UserId::new(9));
        assert_eq!(registered.member_id, None);
    }
}
