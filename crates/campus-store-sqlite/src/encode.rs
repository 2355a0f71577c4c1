//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with fixed microsecond precision so that
//! lexical order equals chronological order. Enumerations use their display
//! labels. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use campus_core::{
  complaint::{Complaint, ComplaintStatus, Priority},
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn encode_status(s: ComplaintStatus) -> &'static str {
  match s {
    ComplaintStatus::Pending => "Pending",
    ComplaintStatus::InProgress => "In Progress",
    ComplaintStatus::Resolved => "Resolved",
    ComplaintStatus::Rejected => "Rejected",
  }
}

pub fn decode_status(s: &str) -> Result<ComplaintStatus> {
  s.parse().map_err(|_| Error::Decode { kind: "status", value: s.to_owned() })
}

pub fn encode_priority(p: Priority) -> &'static str {
  match p {
    Priority::Low => "Low",
    Priority::Medium => "Medium",
    Priority::High => "High",
  }
}

pub fn decode_priority(s: &str) -> Result<Priority> {
  s.parse().map_err(|_| Error::Decode { kind: "priority", value: s.to_owned() })
}

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Student => "student",
    Role::Administrator => "administrator",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::Decode { kind: "role", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawComplaint::from_row`].
pub const COMPLAINT_COLUMNS: &str = "complaint_id, title, description, category, location, \
   contact, status, submitter_id, submitter_email, created_at, priority, feedback";

/// Raw strings read directly from a `complaints` row.
pub struct RawComplaint {
  pub complaint_id:    String,
  pub title:           String,
  pub description:     String,
  pub category:        String,
  pub location:        String,
  pub contact:         String,
  pub status:          String,
  pub submitter_id:    String,
  pub submitter_email: String,
  pub created_at:      String,
  pub priority:        String,
  pub feedback:        Option<String>,
}

impl RawComplaint {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      complaint_id:    row.get(0)?,
      title:           row.get(1)?,
      description:     row.get(2)?,
      category:        row.get(3)?,
      location:        row.get(4)?,
      contact:         row.get(5)?,
      status:          row.get(6)?,
      submitter_id:    row.get(7)?,
      submitter_email: row.get(8)?,
      created_at:      row.get(9)?,
      priority:        row.get(10)?,
      feedback:        row.get(11)?,
    })
  }

  pub fn into_complaint(self) -> Result<Complaint> {
    Ok(Complaint {
      complaint_id:    decode_uuid(&self.complaint_id)?,
      title:           self.title,
      description:     self.description,
      category:        self.category,
      location:        self.location,
      contact:         self.contact,
      status:          decode_status(&self.status)?,
      submitter_id:    decode_uuid(&self.submitter_id)?,
      submitter_email: self.submitter_email,
      created_at:      decode_dt(&self.created_at)?,
      priority:        decode_priority(&self.priority)?,
      feedback:        self.feedback,
    })
  }
}

/// Column list matching [`RawUser::from_row`], qualified with the `u` alias.
pub const USER_COLUMNS: &str =
  "u.user_id, u.email, u.display_name, u.student_id, u.created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub email:        Option<String>,
  pub display_name: Option<String>,
  pub student_id:   Option<String>,
  pub created_at:   String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      email:        row.get(1)?,
      display_name: row.get(2)?,
      student_id:   row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      email:        self.email,
      display_name: self.display_name,
      student_id:   self.student_id,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
