//! SQLite backend for the campus complaint tracker.
//!
//! Plays the part of the hosted document store and auth provider: complaint
//! records, accounts, sessions, roles and federated identities all live in a
//! single SQLite file. Wraps [`tokio_rusqlite`] so all database access runs on
//! a dedicated thread without blocking the async runtime.

mod auth;
mod encode;
mod live;
mod schema;
mod store;

pub mod error;

pub use auth::FederationConfig;
pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
