//! Screen navigation state.
//!
//! The navigator holds the one screen the application is showing. The
//! gateway sends it to [`Screen::Login`] when the server rejects the session;
//! front-ends subscribe to follow those transitions.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parish_core::Role;
use tokio::sync::watch;
use tracing::info;

/// Screens of the parish application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Register,
    Home,
    Members,
    Events,
    Donations,
    Sacraments,
    Districts,
    Announcements,
    Attendance,
    LinkProfile,
}

impl Screen {
    /// Screens a signed-in user can open from the menu.
    pub const MENU: [Self; 8] = [
        Self::Home,
        Self::Members,
        Self::Events,
        Self::Donations,
        Self::Sacraments,
        Self::Districts,
        Self::Announcements,
        Self::Attendance,
    ];

    /// Screens reachable without a session.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Roles allowed on the screen. Empty means any signed-in user.
    #[must_use]
    pub const fn required_roles(self) -> &'static [Role] {
        match self {
            Self::Members | Self::Districts => &[Role::Admin],
            Self::LinkProfile => &[Role::Member, Role::Staff],
            Self::Login
            | Self::Register
            | Self::Home
            | Self::Events
            | Self::Donations
            | Self::Sacraments
            | Self::Announcements
            | Self::Attendance => &[],
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Home => "Home",
            Self::Members => "Members",
            Self::Events => "Events",
            Self::Donations => "Donations",
            Self::Sacraments => "Sacraments",
            Self::Districts => "Districts",
            Self::Announcements => "Announcements",
            Self::Attendance => "Attendance",
            Self::LinkProfile => "Link Profile",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

struct NavigatorInner {
    screen: watch::Sender<Screen>,
    login_redirects: AtomicUsize,
}

/// Shared handle to the current screen.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

impl Navigator {
    /// Navigator starting on `initial`.
    #[must_use]
    pub fn new(initial: Screen) -> Self {
        let (screen, _) = watch::channel(initial);
        Self {
            inner: Arc::new(NavigatorInner {
                screen,
                login_redirects: AtomicUsize::new(0),
            }),
        }
    }

    /// The screen being shown.
    #[must_use]
    pub fn current(&self) -> Screen {
        *self.inner.screen.borrow()
    }

    /// Follow screen changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Screen> {
        self.inner.screen.subscribe()
    }

    /// Show `screen`.
    pub fn navigate(&self, screen: Screen) {
        self.inner.screen.send_replace(screen);
    }

    /// Send the user to the login screen.
    ///
    /// Returns `false` without notifying subscribers when already there, so
    /// concurrent callers produce a single transition.
    pub fn redirect_to_login(&self) -> bool {
        let moved = self.inner.screen.send_if_modified(|screen| {
            if *screen == Screen::Login {
                false
            } else {
                *screen = Screen::Login;
                true
            }
        });
        if moved {
            self.inner.login_redirects.fetch_add(1, Ordering::SeqCst);
            info!("Redirected to login");
        }
        moved
    }

    /// Number of redirects to login performed so far.
    #[must_use]
    pub fn login_redirects(&self) -> usize {
        self.inner.login_redirects.load(Ordering::SeqCst)
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Screen::Login)
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("screen", &self.current())
            .field("login_redirects", &self.login_redirects())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_only_screens() {
        assert_eq!(Screen::Members.required_roles(), &[Role::Admin]);
        assert_eq!(Screen::Districts.required_roles(), &[Role::Admin]);
        assert!(Screen::Donations.required_roles().is_empty());
        assert!(!Screen::LinkProfile.required_roles().contains(&Role::Admin));
    }

    #[test]
    fn test_public_screens() {
        assert!(Screen::Login.is_public());
        assert!(Screen::Register.is_public());
        assert!(Screen::MENU.iter().all(|s| !s.is_public()));
    }

    #[test]
    fn test_redirect_is_idempotent() {
        let navigator = Navigator::new(Screen::Members);
        assert!(navigator.redirect_to_login());
        assert!(!navigator.redirect_to_login());
        assert_eq!(navigator.current(), Screen::Login);
        assert_eq!(navigator.login_redirects(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_redirect() {
        let navigator = Navigator::new(Screen::Home);
        let mut rx = navigator.subscribe();

        navigator.redirect_to_login();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Screen::Login);

        navigator.redirect_to_login();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_navigate_then_redirect_again() {
        let navigator = Navigator::default();
        assert!(!navigator.redirect_to_login());
        navigator.navigate(Screen::Events);
        assert!(navigator.redirect_to_login());
        assert_eq!(navigator.login_redirects(), 1);
    }
}
