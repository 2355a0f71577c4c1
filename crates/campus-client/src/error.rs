//! Error type for the HTTP client.

use campus_core::store::{Failure, StoreFailure};
use eventsource_stream::EventStreamError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("{message}")]
  Api { status: StatusCode, message: String },

  /// An `error` event delivered on a live stream.
  #[error("{0}")]
  Remote(String),

  #[error("malformed response: {0}")]
  Json(#[from] serde_json::Error),

  #[error("live stream failed: {0}")]
  Stream(#[from] EventStreamError<reqwest::Error>),
}

impl StoreFailure for Error {
  fn failure(&self) -> Failure {
    match self {
      Self::Api { status, .. } => match *status {
        StatusCode::UNAUTHORIZED => Failure::Unauthenticated,
        StatusCode::FORBIDDEN => Failure::PermissionDenied,
        StatusCode::NOT_FOUND => Failure::NotFound,
        StatusCode::CONFLICT => Failure::Conflict,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Failure::Invalid,
        _ => Failure::Backend,
      },
      Self::Http(_) | Self::Remote(_) | Self::Json(_) | Self::Stream(_) => Failure::Backend,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
