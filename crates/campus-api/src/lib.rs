//! JSON REST and Server-Sent-Events API for campus complaints.
//!
//! Exposes an axum [`Router`] backed by any type implementing the
//! [`ComplaintStore`], [`AuthProvider`] and [`Authorizer`] traits from
//! `campus-core`. TLS and listener setup are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = campus_api::app(Arc::new(store));
//! axum::serve(listener, app).await?;
//! ```

pub mod account;
pub mod complaints;
pub mod error;
pub mod live;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use campus_core::{
  auth::{AuthProvider, Authorizer},
  store::ComplaintStore,
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use session::Authenticated;

/// Everything the handlers need from a backend.
pub trait Backend: ComplaintStore + AuthProvider + Authorizer + 'static {}

impl<T> Backend for T where T: ComplaintStore + AuthProvider + Authorizer + 'static {}

/// Build the API routes for `store`, relative to `/api`.
pub fn api_router<S: Backend>(store: Arc<S>) -> Router<()> {
  Router::new()
    // Accounts
    .route("/auth/register", post(account::register::<S>))
    .route("/auth/login", post(account::login::<S>))
    .route("/auth/federated", post(account::federated::<S>))
    .route("/auth/logout", post(account::logout::<S>))
    .route("/auth/me", get(account::me::<S>))
    // Complaints
    .route("/complaints", get(complaints::list::<S>).post(complaints::create::<S>))
    .route("/complaints/live", get(live::handler::<S>))
    .route("/complaints/{id}", get(complaints::get_one::<S>))
    .route("/complaints/{id}/status", patch(complaints::set_status::<S>))
    .with_state(store)
}

/// The complete application: the API nested under `/api`, with request
/// tracing.
pub fn app<S: Backend>(store: Arc<S>) -> Router<()> {
  Router::new()
    .nest("/api", api_router(store))
    .layer(TraceLayer::new_for_http())
}
