//! The complaint record and the form input it is created from.
//!
//! A complaint is created by a student with status `Pending` and is later
//! moved between statuses by an administrator. Any status may be set to any
//! other; the data model holds no state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Where a complaint is in its lifecycle.
///
/// Serialised with the human-readable labels ("In Progress", not
/// `in_progress`) because those strings are what every client displays.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ComplaintStatus {
  #[default]
  Pending,
  #[serde(rename = "In Progress")]
  #[strum(to_string = "In Progress", serialize = "in_progress", serialize = "in-progress")]
  InProgress,
  Resolved,
  Rejected,
}

/// How urgently the submitter wants the complaint handled.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

// ─── Complaint ───────────────────────────────────────────────────────────────

/// A persisted complaint record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
  /// Store-assigned; never changes and is never reused.
  pub complaint_id:    Uuid,
  pub title:           String,
  pub description:     String,
  pub category:        String,
  pub location:        String,
  /// Preferred contact (phone number, room, email, ...). Free text.
  pub contact:         String,
  pub status:          ComplaintStatus,
  /// Taken from the caller's session at creation; never changes.
  pub submitter_id:    Uuid,
  /// The submitter's email, or empty if the account has none.
  pub submitter_email: String,
  /// Store-assigned creation timestamp.
  pub created_at:      DateTime<Utc>,
  pub priority:        Priority,
  /// Optional note from the administrator who last changed the status.
  pub feedback:        Option<String>,
}

/// Sort newest first. Used by consumers of owner-filtered results, which the
/// store is not required to order.
pub fn sort_newest_first(complaints: &mut [Complaint]) {
  complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

// ─── NewComplaint ────────────────────────────────────────────────────────────

/// Input to [`crate::store::ComplaintStore::create`].
///
/// Identifier, status, submitter and timestamp are always set by the store.
/// Build one through [`ComplaintDraft::validate`] so blank titles never reach
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComplaint {
  pub title:       String,
  pub description: String,
  #[serde(default)]
  pub category:    String,
  #[serde(default)]
  pub location:    String,
  #[serde(default)]
  pub contact:     String,
  #[serde(default)]
  pub priority:    Priority,
}

impl NewComplaint {
  /// Re-check a complaint that arrived from outside (e.g. over HTTP).
  pub fn validated(self) -> Result<Self> {
    ComplaintDraft::from(self).validate()
  }
}

// ─── ComplaintDraft ──────────────────────────────────────────────────────────

/// Raw form values as typed by the submitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintDraft {
  pub title:       String,
  pub description: String,
  pub category:    String,
  pub location:    String,
  pub contact:     String,
  pub priority:    Priority,
}

impl ComplaintDraft {
  pub const MISSING_FIELDS: &'static str =
    "Please fill in title and description";

  /// Trim every field and reject blank titles or descriptions.
  pub fn validate(&self) -> Result<NewComplaint> {
    let title = self.title.trim();
    let description = self.description.trim();
    if title.is_empty() || description.is_empty() {
      return Err(Error::validation(Self::MISSING_FIELDS));
    }

    Ok(NewComplaint {
      title:       title.to_owned(),
      description: description.to_owned(),
      category:    self.category.trim().to_owned(),
      location:    self.location.trim().to_owned(),
      contact:     self.contact.trim().to_owned(),
      priority:    self.priority,
    })
  }
}

impl From<NewComplaint> for ComplaintDraft {
  fn from(c: NewComplaint) -> Self {
    Self {
      title:       c.title,
      description: c.description,
      category:    c.category,
      location:    c.location,
      contact:     c.contact,
      priority:    c.priority,
    }
  }
}
