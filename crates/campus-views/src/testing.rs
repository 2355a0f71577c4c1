//! Shared fixtures for view-model tests.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use campus_core::{
  auth::AuthProvider,
  complaint::{Complaint, ComplaintDraft, NewComplaint},
  store::{ComplaintFeed, ComplaintQuery, ComplaintStore, StatusUpdate},
  user::{Registration, Session},
};
use campus_store_sqlite::SqliteStore;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "facilities@campus.example";

pub async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
    .with_admin_emails(vec![ADMIN_EMAIL.to_owned()])
}

pub async fn student(s: &SqliteStore, email: &str) -> Session {
  s.register(Registration {
    full_name:        "Test Student".into(),
    student_id:       "S-0001".into(),
    email:            email.into(),
    password:         "hunter22".into(),
    confirm_password: "hunter22".into(),
  })
  .await
  .unwrap()
}

pub async fn admin(s: &SqliteStore) -> Session { student(s, ADMIN_EMAIL).await }

pub fn draft(title: &str) -> ComplaintDraft {
  ComplaintDraft {
    title:       title.into(),
    description: "No cooling in room 204".into(),
    category:    "Facilities".into(),
    location:    "Library".into(),
    contact:     "555-0101".into(),
    ..Default::default()
  }
}

pub async fn file(s: &SqliteStore, session: &Session, title: &str) -> Complaint {
  s.create(session, draft(title).validate().unwrap()).await.unwrap()
}

pub async fn next<E: std::fmt::Debug>(
  feed: &mut ComplaintFeed<E>,
) -> Result<Vec<Complaint>, E> {
  tokio::time::timeout(Duration::from_secs(2), feed.next())
    .await
    .expect("no emission within timeout")
    .expect("feed ended")
}

/// Delegates to an inner store and counts the writes that reach it.
#[derive(Clone)]
pub struct CountingStore {
  pub inner:   SqliteStore,
  pub creates: Arc<AtomicUsize>,
}

impl CountingStore {
  pub fn new(inner: SqliteStore) -> Self { Self { inner, creates: Arc::default() } }

  pub fn creates(&self) -> usize { self.creates.load(Ordering::SeqCst) }
}

impl ComplaintStore for CountingStore {
  type Error = campus_store_sqlite::Error;

  async fn create(&self, session: &Session, input: NewComplaint) -> Result<Complaint, Self::Error> {
    self.creates.fetch_add(1, Ordering::SeqCst);
    self.inner.create(session, input).await
  }

  async fn get(&self, session: &Session, id: Uuid) -> Result<Option<Complaint>, Self::Error> {
    self.inner.get(session, id).await
  }

  async fn list(
    &self,
    session: &Session,
    query: &ComplaintQuery,
  ) -> Result<Vec<Complaint>, Self::Error> {
    self.inner.list(session, query).await
  }

  async fn update_status(
    &self,
    session: &Session,
    id: Uuid,
    update: StatusUpdate,
  ) -> Result<Complaint, Self::Error> {
    self.inner.update_status(session, id, update).await
  }

  fn subscribe(
    &self,
    session: &Session,
    query: ComplaintQuery,
  ) -> Result<ComplaintFeed<Self::Error>, Self::Error> {
    self.inner.subscribe(session, query)
  }
}
