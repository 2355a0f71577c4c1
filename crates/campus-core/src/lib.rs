//! Core types and trait definitions for the campus complaint tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the API and the client all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod complaint;
pub mod error;
pub mod store;
pub mod subscription;
pub mod user;

pub use error::{Error, Result};
