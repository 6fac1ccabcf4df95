//! Role-based route guard.
//!
//! Decides, from the current session and a screen's required roles, whether
//! the screen renders, shows access denied, or sends the user to login.

use parish_core::{Role, UserRecord};
use tracing::debug;

use crate::navigator::{Navigator, Screen};
use crate::session::SessionManager;

/// Outcome of checking a user against a role requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No session.
    Unauthenticated,
    /// Signed in with a role outside the required set.
    Denied {
        /// The user's role.
        role: Role,
    },
    /// Allowed.
    Granted(UserRecord),
}

/// Check `user` against `required`. An empty `required` admits any
/// signed-in user.
#[must_use]
pub fn authorize(user: Option<&UserRecord>, required: &[Role]) -> Access {
    match user {
        None => Access::Unauthenticated,
        Some(user) if required.is_empty() || required.contains(&user.role) => {
            Access::Granted(user.clone())
        }
        Some(user) => Access::Denied { role: user.role },
    }
}

/// What the front-end should do when the user asks for a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the screen. `user` is `None` only on public screens.
    Render {
        /// The signed-in user, if any.
        user: Option<UserRecord>,
    },
    /// Show an access-denied notice; the current screen stays.
    AccessDenied {
        /// Requested screen.
        screen: Screen,
        /// The user's role.
        role: Role,
    },
    /// No session; the navigator has been sent to login.
    RedirectToLogin,
}

/// Guards screen entry with the current session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionManager,
    navigator: Navigator,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(session: SessionManager, navigator: Navigator) -> Self {
        Self { session, navigator }
    }

    /// Try to enter `screen`, navigating on success or redirecting to login.
    pub async fn enter(&self, screen: Screen) -> GuardOutcome {
        let user = self.session.current_user().await;

        if screen.is_public() {
            self.navigator.navigate(screen);
            return GuardOutcome::Render { user };
        }

        match authorize(user.as_ref(), screen.required_roles()) {
            Access::Granted(user) => {
                self.navigator.navigate(screen);
                GuardOutcome::Render { user: Some(user) }
            }
            Access::Denied { role } => {
                debug!(%screen, %role, "Access denied");
                GuardOutcome::AccessDenied { screen, role }
            }
            Access::Unauthenticated => {
                self.navigator.redirect_to_login();
                GuardOutcome::RedirectToLogin
            }
        }
    }

    /// Check the current user against `required` without navigating.
    pub async fn check(&self, required: &[Role]) -> Access {
        authorize(self.session.current_user().await.as_ref(), required)
    }
}
