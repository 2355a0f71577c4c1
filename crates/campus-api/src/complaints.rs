//! Handlers for `/complaints` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/complaints` | Optional `?owner=<uuid>&status=<status>&limit=<n>` |
//! | `POST`  | `/complaints` | `NewComplaint` body; 400 on blank title/description |
//! | `GET`   | `/complaints/{id}` | 404 if not found |
//! | `PATCH` | `/complaints/{id}/status` | `{"status":"Resolved","feedback":…}`; 403 for non-admins |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  complaint::{Complaint, NewComplaint},
  store::{ComplaintQuery, StatusUpdate},
};
use uuid::Uuid;

use crate::{Backend, error::ApiError, session::Authenticated};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /complaints[?owner=&status=&limit=]`
pub async fn list<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
  Query(query): Query<ComplaintQuery>,
) -> Result<Json<Vec<Complaint>>, ApiError> {
  let complaints = store.list(&session, &query).await.map_err(ApiError::store)?;
  Ok(Json(complaints))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /complaints`
pub async fn create<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
  Json(body): Json<NewComplaint>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body.validated()?;
  let complaint = store.create(&session, input).await.map_err(ApiError::store)?;
  tracing::info!(
    complaint_id = %complaint.complaint_id,
    user_id = %session.user_id(),
    "complaint created"
  );
  Ok((StatusCode::CREATED, Json(complaint)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /complaints/{id}`
pub async fn get_one<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Complaint>, ApiError> {
  let complaint = store
    .get(&session, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))?;
  Ok(Json(complaint))
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// `PATCH /complaints/{id}/status`
pub async fn set_status<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusUpdate>,
) -> Result<Json<Complaint>, ApiError> {
  let status = body.status;
  let complaint = store
    .update_status(&session, id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(complaint_id = %id, %status, "complaint status changed");
  Ok(Json(complaint))
}
