//! Remote access to a campus complaints server.
//!
//! [`HttpClient`] implements the `campus-core` store and auth traits over the
//! JSON API, so the view models in `campus-views` run unchanged against a
//! remote server. [`settings`] holds the command-line client's configuration
//! and session persistence.

pub mod client;
pub mod error;
pub mod settings;

pub use client::{DEFAULT_URL, HttpClient};
pub use error::{Error, Result};
