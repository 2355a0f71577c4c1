//! Per-screen UI state shared by all view models.

use std::fmt;

/// `Idle → Loading → {Loaded, Error}`; `Loaded → Loading` on refresh and
/// `Error → Loading` on retry. Screens are created in `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
  Idle,
  Loading,
  Loaded(T),
  Error(String),
}

impl<T> Default for LoadState<T> {
  fn default() -> Self { Self::Idle }
}

impl<T> LoadState<T> {
  /// Enter `Loading`, discarding any previous data or error.
  pub fn begin(&mut self) { *self = Self::Loading; }

  pub fn finish(&mut self, result: Result<T, String>) {
    *self = match result {
      Ok(v) => Self::Loaded(v),
      Err(msg) => Self::Error(msg),
    };
  }

  pub fn loaded(&self) -> Option<&T> {
    match self {
      Self::Loaded(v) => Some(v),
      _ => None,
    }
  }

  pub fn loaded_mut(&mut self) -> Option<&mut T> {
    match self {
      Self::Loaded(v) => Some(v),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      Self::Error(msg) => Some(msg),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool { matches!(self, Self::Loading) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
  Success,
  Failure,
}

/// Transient feedback after a user action (a snackbar, a status-bar line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub kind:    NoticeKind,
  pub message: String,
}

impl Notice {
  pub fn success(message: impl Into<String>) -> Self {
    Self { kind: NoticeKind::Success, message: message.into() }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self { kind: NoticeKind::Failure, message: message.into() }
  }

  pub fn is_failure(&self) -> bool { self.kind == NoticeKind::Failure }
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.message) }
}
