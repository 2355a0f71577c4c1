//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | `Registration` body, 201 + session |
//! | `POST` | `/auth/login` | `Credentials` body |
//! | `POST` | `/auth/federated` | `FederatedCredential` body |
//! | `POST` | `/auth/logout` | 204 |
//! | `GET`  | `/auth/me` | `{ "user": …, "role": …, "issued_at": … }` |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use campus_core::user::{Credentials, FederatedCredential, Registration, Role, Session, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Backend, error::ApiError, session::Authenticated};

/// `GET /auth/me` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
  pub user:      User,
  pub role:      Role,
  /// When the presented token was issued.
  pub issued_at: DateTime<Utc>,
}

/// `POST /auth/register`
pub async fn register<S: Backend>(
  State(store): State<Arc<S>>,
  Json(body): Json<Registration>,
) -> Result<impl IntoResponse, ApiError> {
  let registration = body.validated()?;
  let session = store.register(registration).await.map_err(ApiError::store)?;
  tracing::info!(user_id = %session.user_id(), "account registered");
  Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /auth/login`
pub async fn login<S: Backend>(
  State(store): State<Arc<S>>,
  Json(body): Json<Credentials>,
) -> Result<Json<Session>, ApiError> {
  let credentials = body.validated()?;
  let session = store.sign_in(credentials).await.map_err(ApiError::store)?;
  Ok(Json(session))
}

/// `POST /auth/federated`
pub async fn federated<S: Backend>(
  State(store): State<Arc<S>>,
  Json(body): Json<FederatedCredential>,
) -> Result<Json<Session>, ApiError> {
  let session = store
    .exchange_credential(body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

/// `POST /auth/logout`
pub async fn logout<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
) -> Result<StatusCode, ApiError> {
  store.sign_out(&session).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me`
pub async fn me<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
) -> Result<Json<Me>, ApiError> {
  let role = store.role_of(&session).await.map_err(ApiError::store)?;
  Ok(Json(Me { user: session.user, role, issued_at: session.issued_at }))
}
