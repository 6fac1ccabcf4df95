//! Core types for the parish client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod email;
pub mod id;
pub mod role;
pub mod user;

pub use amount::{Amount, AmountError};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, RoleParseError};
pub use user::UserRecord;
