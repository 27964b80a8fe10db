//! Admin console client.
//!
//! Authenticates against the admin backend, fetches the menu tree the
//! backend grants the user, registers a route per menu leaf, and guards
//! every navigation on authentication state. The `admin-client` binary
//! drives a [`session::Session`] from the command line.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod menu;
pub mod router;
pub mod session;
pub mod storage;
pub mod token;
