//! Users, sessions and the credential inputs that produce them.
//!
//! A [`Session`] is an explicit value: it is created once at sign-in and
//! passed to every store operation. Nothing reads a process-wide "current
//! user".

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  /// Accounts created through identity federation may have no email.
  pub email:        Option<String>,
  pub display_name: Option<String>,
  pub student_id:   Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// What a user is allowed to do.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  Student,
  Administrator,
}

impl Role {
  /// Whether the role may change complaint status.
  pub fn can_triage(self) -> bool { matches!(self, Self::Administrator) }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// An authenticated caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub user:      User,
  /// Opaque bearer token issued by the auth provider.
  pub token:     String,
  pub issued_at: DateTime<Utc>,
}

impl Session {
  pub fn user_id(&self) -> Uuid { self.user.user_id }
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("user", &self.user)
      .field("token", &"<redacted>")
      .field("issued_at", &self.issued_at)
      .finish()
  }
}

// ─── Credential inputs ───────────────────────────────────────────────────────

/// Email + password sign-in.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl Credentials {
  pub const MISSING_FIELDS: &'static str = "Email and password are required.";

  /// Trim the email and reject blank fields.
  pub fn validated(self) -> Result<Self> {
    let email = self.email.trim().to_owned();
    if email.is_empty() || self.password.trim().is_empty() {
      return Err(Error::validation(Self::MISSING_FIELDS));
    }
    Ok(Self { email, password: self.password })
  }
}

/// Account creation form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Registration {
  pub full_name:        String,
  pub student_id:       String,
  pub email:            String,
  pub password:         String,
  pub confirm_password: String,
}

impl Registration {
  pub const MISSING_FIELDS: &'static str = "All fields are required.";
  pub const MISSING_PASSWORD: &'static str = "Password fields are required.";
  pub const PASSWORD_MISMATCH: &'static str = "Passwords do not match.";

  /// Checks run in the same order the registration form reports them.
  pub fn validated(self) -> Result<Self> {
    let full_name = self.full_name.trim().to_owned();
    let student_id = self.student_id.trim().to_owned();
    let email = self.email.trim().to_owned();

    if full_name.is_empty() || student_id.is_empty() || email.is_empty() {
      return Err(Error::validation(Self::MISSING_FIELDS));
    }
    if self.password.trim().is_empty() || self.confirm_password.trim().is_empty() {
      return Err(Error::validation(Self::MISSING_PASSWORD));
    }
    if self.password != self.confirm_password {
      return Err(Error::validation(Self::PASSWORD_MISMATCH));
    }

    Ok(Self {
      full_name,
      student_id,
      email,
      password: self.password,
      confirm_password: self.confirm_password,
    })
  }
}

/// An ID token obtained from a federated identity provider, to be exchanged
/// for a local session.
#[derive(Clone, Serialize, Deserialize)]
pub struct FederatedCredential {
  /// Provider name, e.g. `"google"`.
  pub provider: String,
  pub id_token: String,
}
