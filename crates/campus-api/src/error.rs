//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use campus_core::store::{Failure, StoreFailure};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by its [`Failure`] kind.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + StoreFailure + Send + Sync + 'static,
  {
    match e.failure() {
      Failure::NotFound => Self::NotFound(e.to_string()),
      Failure::PermissionDenied => Self::Forbidden(e.to_string()),
      Failure::Unauthenticated => Self::Unauthorized(e.to_string()),
      Failure::Conflict => Self::Conflict(e.to_string()),
      Failure::Invalid => Self::BadRequest(e.to_string()),
      Failure::Backend => Self::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<campus_core::Error> for ApiError {
  fn from(e: campus_core::Error) -> Self {
    match e {
      campus_core::Error::Validation(m) => Self::BadRequest(m),
      campus_core::Error::Auth(m) => Self::Unauthorized(m),
      campus_core::Error::Write(e) | campus_core::Error::Read(e) => Self::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if let Self::Store(e) = &self {
      tracing::error!(error = %e, "store failure");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"campus\""),
      );
    }
    res
  }
}
