//! Parish Client - authenticated access to the parish management API.
//!
//! # Architecture
//!
//! One [`SessionManager`] owns the signed-in session (bearer token plus user
//! record) and persists it through a [`SessionStore`]. Every request goes
//! through the [`Gateway`], which attaches the token and, when the backend
//! rejects it, clears the session and sends the [`Navigator`] to the login
//! screen before the error reaches the caller. Screens are entered through
//! the [`RouteGuard`]; record lists are [`ResourcePage`]s over the generic
//! [`Resource`] CRUD.
//!
//! # Modules
//!
//! - [`session`] - Session state, persistence, and the login/logout lifecycle
//! - [`gateway`] - HTTP requests with bearer injection and 401 handling
//! - [`guard`] - Role checks for screen entry
//! - [`navigator`] - Current screen and login redirects
//! - [`auth`] - Login, registration, and profile linking endpoints
//! - [`resources`] - Typed CRUD for members, events, donations and the rest
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod navigator;
pub mod resources;
pub mod session;

pub use app::ParishClient;
pub use auth::{AuthApi, LinkOutcome, Registered, Registration};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ErrorKind};
pub use gateway::Gateway;
pub use guard::{Access, GuardOutcome, RouteGuard, authorize};
pub use navigator::{Navigator, Screen};
pub use resources::{
    Confirm, Deletion, MountHandle, Refresh, Resource, ResourceClient, ResourcePage,
};
pub use session::{
    Authenticator, FileSessionStore, MemorySessionStore, Session, SessionManager, SessionStore,
    StoreError,
};
