//! The `ComplaintStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`campus-store-sqlite`) and by
//! remote clients (`campus-client`). View models depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  complaint::{Complaint, ComplaintStatus, NewComplaint},
  subscription::Subscription,
  user::Session,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters shared by [`ComplaintStore::list`] and
/// [`ComplaintStore::subscribe`]. Results are always newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintQuery {
  /// Only complaints submitted by this user.
  pub owner:  Option<Uuid>,
  pub status: Option<ComplaintStatus>,
  /// Top-N by recency.
  pub limit:  Option<usize>,
}

impl ComplaintQuery {
  pub fn all() -> Self { Self::default() }

  pub fn by_owner(owner: Uuid) -> Self { Self { owner: Some(owner), ..Self::default() } }

  pub fn with_limit(mut self, limit: Option<usize>) -> Self {
    self.limit = limit;
    self
  }

  /// Whether `complaint` belongs to this query's result set, ignoring `limit`.
  pub fn matches(&self, complaint: &Complaint) -> bool {
    self.owner.is_none_or(|o| complaint.submitter_id == o)
      && self.status.is_none_or(|s| complaint.status == s)
  }
}

/// Body of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
  pub status:   ComplaintStatus,
  /// When `Some`, replaces the complaint's feedback note.
  #[serde(default)]
  pub feedback: Option<String>,
}

impl From<ComplaintStatus> for StatusUpdate {
  fn from(status: ComplaintStatus) -> Self { Self { status, feedback: None } }
}

// ─── Failure classification ──────────────────────────────────────────────────

/// Coarse reason a backend operation failed, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
  NotFound,
  PermissionDenied,
  Unauthenticated,
  Conflict,
  Invalid,
  Backend,
}

/// Implemented by backend error types so upper layers can react to the kind
/// of failure without knowing the backend.
pub trait StoreFailure {
  fn failure(&self) -> Failure;
}

impl StoreFailure for std::convert::Infallible {
  fn failure(&self) -> Failure { match *self {} }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The live snapshot stream produced by [`ComplaintStore::subscribe`].
pub type ComplaintFeed<E> = Subscription<Vec<Complaint>, E>;

/// Abstraction over the remote complaint collection.
///
/// Every operation takes the caller's [`Session`]; backends enforce their
/// access rules against it. All methods return `Send` futures so the trait can
/// be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ComplaintStore: Send + Sync {
  type Error: std::error::Error + StoreFailure + Send + Sync + 'static;

  /// Persist a new complaint. The store assigns the identifier, the creation
  /// timestamp and `Pending` status, and records the session's user as the
  /// submitter.
  fn create<'a>(
    &'a self,
    session: &'a Session,
    input: NewComplaint,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + 'a;

  /// Retrieve a complaint by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    session: &'a Session,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + 'a;

  /// One-shot read of the complaints matching `query`.
  fn list<'a>(
    &'a self,
    session: &'a Session,
    query: &'a ComplaintQuery,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + 'a;

  /// Partial update of `status` (and `feedback` when supplied).
  ///
  /// Fails without creating anything when `id` does not exist or when the
  /// caller may not triage complaints. Setting the current status again is a
  /// no-op.
  fn update_status<'a>(
    &'a self,
    session: &'a Session,
    id: Uuid,
    update: StatusUpdate,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + 'a;

  /// Start a live query. The first emission is the current result set; each
  /// later emission is the full result set after a change.
  fn subscribe(
    &self,
    session: &Session,
    query: ComplaintQuery,
  ) -> Result<ComplaintFeed<Self::Error>, Self::Error>;

  /// All complaints, newest first, optionally limited to the `limit` most
  /// recent.
  fn subscribe_all(
    &self,
    session: &Session,
    limit: Option<usize>,
  ) -> Result<ComplaintFeed<Self::Error>, Self::Error> {
    self.subscribe(session, ComplaintQuery::all().with_limit(limit))
  }

  /// Complaints submitted by `owner`. Consumers re-sort by recency after
  /// receipt; see [`crate::complaint::sort_newest_first`].
  fn subscribe_by_owner(
    &self,
    session: &Session,
    owner: Uuid,
  ) -> Result<ComplaintFeed<Self::Error>, Self::Error> {
    self.subscribe(session, ComplaintQuery::by_owner(owner))
  }
}
