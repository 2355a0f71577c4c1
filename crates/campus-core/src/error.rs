//! Error taxonomy surfaced to users of the view layer.
//!
//! Backends keep their own error types; callers map them into one of these
//! four kinds depending on the operation that failed.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was empty or two fields disagree. Raised before any
  /// network call.
  #[error("{0}")]
  Validation(String),

  /// Sign-in, sign-up, credential exchange or an authorization check failed.
  #[error("{0}")]
  Auth(String),

  /// A create or update was rejected by the store.
  #[error("{0}")]
  Write(#[source] BoxError),

  /// A fetch or live subscription failed.
  #[error("{0}")]
  Read(#[source] BoxError),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn write(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Write(Box::new(e))
  }

  pub fn read(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Read(Box::new(e))
  }

  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }

  pub fn is_write(&self) -> bool { matches!(self, Self::Write(_)) }

  /// Short message suitable for a transient notice or an error banner.
  pub fn user_message(&self) -> String { self.to_string() }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
