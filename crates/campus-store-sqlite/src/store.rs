//! [`SqliteStore`] — the SQLite implementation of [`ComplaintStore`].

use std::{path::Path, sync::Arc};

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use campus_core::{
  complaint::{Complaint, ComplaintStatus, NewComplaint},
  store::{ComplaintFeed, ComplaintQuery, ComplaintStore, StatusUpdate},
  user::{Session, User},
};

use crate::{
  Error, Result,
  auth::FederationConfig,
  encode::{
    COMPLAINT_COLUMNS, RawComplaint, encode_dt, encode_priority, encode_status, encode_uuid,
  },
  live,
  schema::SCHEMA,
};

/// Buffered change signals. Slow live queries see `Lagged` and re-query once.
const CHANGE_CAPACITY: usize = 16;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A complaint store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection and change channel are
/// reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:         tokio_rusqlite::Connection,
  pub(crate) changes:      broadcast::Sender<()>,
  pub(crate) federation:   Option<Arc<FederationConfig>>,
  /// Emails that are granted the administrator role when they register.
  pub(crate) admin_emails: Arc<Vec<String>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
    Ok(Self {
      conn,
      changes,
      federation: None,
      admin_emails: Arc::new(Vec::new()),
    })
  }

  /// Accept federated ID tokens issued under `config`.
  pub fn with_federation(mut self, config: FederationConfig) -> Self {
    self.federation = Some(Arc::new(config));
    self
  }

  /// Grant the administrator role to these emails on registration.
  pub fn with_admin_emails(mut self, emails: Vec<String>) -> Self {
    self.admin_emails = Arc::new(emails);
    self
  }

  /// Wake every live query. Sending fails only when no query is listening.
  pub(crate) fn notify(&self) { let _ = self.changes.send(()); }

  /// Run `query` without any session check. Live queries call this after
  /// authenticating once per emission.
  pub(crate) async fn select(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    let owner = query.owner.map(encode_uuid);
    let status = query.status.map(encode_status);
    let limit = query
      .limit
      .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {COMPLAINT_COLUMNS}
           FROM complaints
           WHERE (?1 IS NULL OR submitter_id = ?1)
             AND (?2 IS NULL OR status = ?2)
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner, status, limit], RawComplaint::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn select_one(&self, id: Uuid) -> Result<Option<Complaint>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"),
              rusqlite::params![id_str],
              RawComplaint::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn insert_complaint(&self, complaint: &Complaint) -> Result<()> {
    let id_str        = encode_uuid(complaint.complaint_id);
    let title         = complaint.title.clone();
    let description   = complaint.description.clone();
    let category      = complaint.category.clone();
    let location      = complaint.location.clone();
    let contact       = complaint.contact.clone();
    let status_str    = encode_status(complaint.status);
    let submitter_str = encode_uuid(complaint.submitter_id);
    let email         = complaint.submitter_email.clone();
    let created_str   = encode_dt(complaint.created_at);
    let priority_str  = encode_priority(complaint.priority);
    let feedback      = complaint.feedback.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO complaints (
             complaint_id, title, description, category, location, contact,
             status, submitter_id, submitter_email, created_at, priority, feedback
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id_str,
            title,
            description,
            category,
            location,
            contact,
            status_str,
            submitter_str,
            email,
            created_str,
            priority_str,
            feedback,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for SqliteStore {
  type Error = Error;

  async fn create(&self, session: &Session, input: NewComplaint) -> Result<Complaint> {
    let user: User = self.authenticate(session).await?;

    let complaint = Complaint {
      complaint_id:    Uuid::new_v4(),
      title:           input.title,
      description:     input.description,
      category:        input.category,
      location:        input.location,
      contact:         input.contact,
      status:          ComplaintStatus::Pending,
      submitter_id:    user.user_id,
      submitter_email: user.email.unwrap_or_default(),
      // Stored with microsecond precision; keep the returned value identical.
      created_at:      Utc::now().trunc_subsecs(6),
      priority:        input.priority,
      feedback:        None,
    };

    self.insert_complaint(&complaint).await?;
    self.notify();
    Ok(complaint)
  }

  async fn get(&self, session: &Session, id: Uuid) -> Result<Option<Complaint>> {
    self.authenticate(session).await?;
    self.select_one(id).await
  }

  async fn list(&self, session: &Session, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    self.authenticate(session).await?;
    self.select(query).await
  }

  async fn update_status(
    &self,
    session: &Session,
    id: Uuid,
    update: StatusUpdate,
  ) -> Result<Complaint> {
    let user = self.authenticate(session).await?;
    if !self.role_of_user(user.user_id).await?.can_triage() {
      tracing::warn!(user_id = %user.user_id, complaint_id = %id, "status change refused");
      return Err(Error::PermissionDenied("only administrators may change complaint status"));
    }

    let id_str     = encode_uuid(id);
    let status_str = encode_status(update.status);
    let feedback   = update.feedback;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE complaints
           SET status = ?2, feedback = COALESCE(?3, feedback)
           WHERE complaint_id = ?1",
          rusqlite::params![id_str, status_str, feedback],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ComplaintNotFound(id));
    }
    self.notify();

    self.select_one(id).await?.ok_or(Error::ComplaintNotFound(id))
  }

  fn subscribe(&self, session: &Session, query: ComplaintQuery) -> Result<ComplaintFeed<Error>> {
    Ok(live::spawn_feed(self.clone(), session.clone(), query))
  }
}
