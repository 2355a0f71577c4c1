//! Error type for `campus-store-sqlite`.

use campus_core::store::{Failure, StoreFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enumeration value that no variant matches.
  #[error("unrecognised {kind} value: {value:?}")]
  Decode { kind: &'static str, value: String },

  #[error("complaint not found: {0}")]
  ComplaintNotFound(uuid::Uuid),

  #[error("permission denied: {0}")]
  PermissionDenied(&'static str),

  #[error("not signed in or session expired")]
  Unauthenticated,

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("an account already exists for {0}")]
  EmailTaken(String),

  #[error("{0}")]
  Invalid(String),

  #[error("federated sign-in is not configured")]
  FederationDisabled,

  #[error("federated credential rejected: {0}")]
  FederationRejected(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

impl StoreFailure for Error {
  fn failure(&self) -> Failure {
    match self {
      Self::ComplaintNotFound(_) => Failure::NotFound,
      Self::PermissionDenied(_) => Failure::PermissionDenied,
      Self::Unauthenticated
      | Self::InvalidCredentials
      | Self::FederationRejected(_) => Failure::Unauthenticated,
      Self::EmailTaken(_) => Failure::Conflict,
      Self::Invalid(_) | Self::FederationDisabled => Failure::Invalid,
      Self::Database(_)
      | Self::Uuid(_)
      | Self::DateParse(_)
      | Self::Decode { .. }
      | Self::PasswordHash(_) => Failure::Backend,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
