//! Parish Core - Shared types library.
//!
//! This crate provides the types shared by every parish client component:
//! - `client` - Session manager, request gateway, route guard and resource pages
//! - `cli` - The `parish` terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Every record the backend returns is decoded into one of these types, so a
//! malformed payload is rejected at the gateway boundary instead of deep in a
//! screen.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, amounts and the authenticated user
//! - [`records`] - One typed record (plus create/update payloads) per resource

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod records;
pub mod types;

pub use records::*;
pub use types::*;
