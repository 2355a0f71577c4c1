//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use chrono::{SubsecRound as _, Utc};
use jsonwebtoken::{EncodingKey, Header};
use uuid::Uuid;

use campus_core::{
  auth::{AuthProvider, Authorizer},
  complaint::{ComplaintDraft, ComplaintStatus, NewComplaint, Priority},
  store::{ComplaintQuery, ComplaintStore, Failure, StatusUpdate, StoreFailure},
  user::{Credentials, FederatedCredential, Registration, Role, Session},
};

use crate::{Error, FederationConfig, SqliteStore, auth::IdClaims};

const ADMIN_EMAIL: &str = "facilities@campus.example";

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
    .with_admin_emails(vec![ADMIN_EMAIL.to_owned()])
}

fn registration(email: &str) -> Registration {
  Registration {
    full_name:        "Test Student".into(),
    student_id:       "S-0001".into(),
    email:            email.into(),
    password:         "hunter22".into(),
    confirm_password: "hunter22".into(),
  }
}

async fn student(s: &SqliteStore, email: &str) -> Session {
  s.register(registration(email)).await.unwrap()
}

async fn admin(s: &SqliteStore) -> Session { student(s, ADMIN_EMAIL).await }

fn broken_ac() -> NewComplaint {
  ComplaintDraft {
    title:       "Broken AC".into(),
    description: "No cooling in room 204".into(),
    category:    "Facilities".into(),
    location:    "Library".into(),
    contact:     "555-0101".into(),
    priority:    Priority::Medium,
  }
  .validate()
  .unwrap()
}

fn titled(title: &str) -> NewComplaint {
  NewComplaint { title: title.into(), ..broken_ac() }
}

async fn next_snapshot(
  feed: &mut campus_core::store::ComplaintFeed<Error>,
) -> Vec<campus_core::complaint::Complaint> {
  tokio::time::timeout(Duration::from_secs(2), feed.next())
    .await
    .expect("no emission within timeout")
    .expect("feed ended")
    .expect("feed emitted an error")
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_sign_in() {
  let s = store().await;
  let registered = student(&s, "ada@campus.example").await;
  assert_eq!(registered.user.email.as_deref(), Some("ada@campus.example"));
  assert_eq!(registered.user.student_id.as_deref(), Some("S-0001"));

  let signed_in = s
    .sign_in(Credentials {
      email:    "ADA@campus.example".into(),
      password: "hunter22".into(),
    })
    .await
    .unwrap();
  assert_eq!(signed_in.user_id(), registered.user_id());
  assert_ne!(signed_in.token, registered.token);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  student(&s, "ada@campus.example").await;
  let err = s.register(registration("Ada@Campus.example")).await.unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
  assert_eq!(err.failure(), Failure::Conflict);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
  let s = store().await;
  student(&s, "ada@campus.example").await;
  let err = s
    .sign_in(Credentials { email: "ada@campus.example".into(), password: "nope".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn invalid_registration_is_refused_by_the_store_too() {
  let s = store().await;
  let mut r = registration("ada@campus.example");
  r.confirm_password = "different".into();
  let err = s.register(r).await.unwrap_err();
  assert_eq!(err.failure(), Failure::Invalid);
}

#[tokio::test]
async fn sign_out_revokes_the_token() {
  let s = store().await;
  let session = student(&s, "ada@campus.example").await;
  assert!(s.resolve(&session.token).await.unwrap().is_some());

  s.sign_out(&session).await.unwrap();
  s.sign_out(&session).await.unwrap();

  assert!(s.resolve(&session.token).await.unwrap().is_none());
  let err = s.create(&session, broken_ac()).await.unwrap_err();
  assert!(matches!(err, Error::Unauthenticated));
}

#[tokio::test]
async fn roles_come_from_the_role_table() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let boss = admin(&s).await;
  assert_eq!(s.role_of(&ada).await.unwrap(), Role::Student);
  assert_eq!(s.role_of(&boss).await.unwrap(), Role::Administrator);

  assert!(s.grant_admin("ada@campus.example").await.unwrap());
  assert_eq!(s.role_of(&ada).await.unwrap(), Role::Administrator);
  assert!(!s.grant_admin("nobody@campus.example").await.unwrap());
}

// ─── Federation ──────────────────────────────────────────────────────────────

fn federation() -> FederationConfig {
  FederationConfig {
    provider: "google".into(),
    issuer:   "https://accounts.example".into(),
    audience: "campus-app".into(),
    secret:   "federation-test-secret".into(),
  }
}

fn id_token(sub: &str, email: Option<&str>, secret: &str) -> String {
  let claims = IdClaims {
    sub:   sub.into(),
    email: email.map(Into::into),
    name:  Some("Fed User".into()),
    iss:   "https://accounts.example".into(),
    aud:   "campus-app".into(),
    exp:   (Utc::now().timestamp() + 3600) as u64,
  };
  jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .unwrap()
}

#[tokio::test]
async fn federated_sign_in_creates_then_reuses_an_account() {
  let s = store().await.with_federation(federation());
  let cred = || FederatedCredential {
    provider: "google".into(),
    id_token: id_token("g-123", Some("fed@campus.example"), "federation-test-secret"),
  };

  let first = s.exchange_credential(cred()).await.unwrap();
  let second = s.exchange_credential(cred()).await.unwrap();
  assert_eq!(first.user_id(), second.user_id());
  assert_eq!(first.user.display_name.as_deref(), Some("Fed User"));

  // A federated-only account has no password to sign in with.
  let err = s
    .sign_in(Credentials { email: "fed@campus.example".into(), password: "x".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn federated_sign_in_links_an_existing_email_account() {
  let s = store().await.with_federation(federation());
  let ada = student(&s, "ada@campus.example").await;

  let fed = s
    .exchange_credential(FederatedCredential {
      provider: "google".into(),
      id_token: id_token("g-ada", Some("ada@campus.example"), "federation-test-secret"),
    })
    .await
    .unwrap();
  assert_eq!(fed.user_id(), ada.user_id());
}

#[tokio::test]
async fn forged_or_unconfigured_federation_is_rejected() {
  let s = store().await;
  let cred = FederatedCredential {
    provider: "google".into(),
    id_token: id_token("g-1", None, "federation-test-secret"),
  };
  assert!(matches!(
    s.exchange_credential(cred.clone()).await,
    Err(Error::FederationDisabled)
  ));

  let s = s.with_federation(federation());
  let forged = FederatedCredential {
    provider: "google".into(),
    id_token: id_token("g-1", None, "someone-elses-secret"),
  };
  assert!(matches!(
    s.exchange_credential(forged).await,
    Err(Error::FederationRejected(_))
  ));

  let wrong_provider = FederatedCredential { provider: "github".into(), ..cred };
  assert!(matches!(
    s.exchange_credential(wrong_provider).await,
    Err(Error::FederationRejected(_))
  ));
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_identity_status_and_submitter() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let before = Utc::now().trunc_subsecs(6);

  let created = s.create(&ada, broken_ac()).await.unwrap();
  assert_eq!(created.status, ComplaintStatus::Pending);
  assert_eq!(created.submitter_id, ada.user_id());
  assert_eq!(created.submitter_email, "ada@campus.example");
  assert_eq!(created.feedback, None);
  assert!(created.created_at >= before && created.created_at <= Utc::now());

  let fetched = s.get(&ada, created.complaint_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  let again = s.create(&ada, broken_ac()).await.unwrap();
  assert_ne!(again.complaint_id, created.complaint_id);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  assert!(s.get(&ada, Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_newest_first_and_filterable() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let bob = student(&s, "bob@campus.example").await;
  let boss = admin(&s).await;

  let a1 = s.create(&ada, titled("a1")).await.unwrap();
  let b1 = s.create(&bob, titled("b1")).await.unwrap();
  let a2 = s.create(&ada, titled("a2")).await.unwrap();
  s.update_status(&boss, a1.complaint_id, ComplaintStatus::Resolved.into())
    .await
    .unwrap();

  let all = s.list(&ada, &ComplaintQuery::all()).await.unwrap();
  let titles: Vec<_> = all.iter().map(|c| c.title.as_str()).collect();
  assert_eq!(titles, ["a2", "b1", "a1"]);

  let mine = s.list(&ada, &ComplaintQuery::by_owner(ada.user_id())).await.unwrap();
  assert!(mine.iter().all(|c| c.submitter_id == ada.user_id()));
  assert_eq!(mine.len(), 2);

  let top = s.list(&bob, &ComplaintQuery::all().with_limit(Some(1))).await.unwrap();
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].complaint_id, a2.complaint_id);

  let resolved = s
    .list(&bob, &ComplaintQuery { status: Some(ComplaintStatus::Resolved), ..ComplaintQuery::all() })
    .await
    .unwrap();
  assert_eq!(resolved.len(), 1);
  assert_eq!(resolved[0].complaint_id, a1.complaint_id);
  assert_ne!(b1.complaint_id, a1.complaint_id);
}

// ─── Status updates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_resolves_a_pending_complaint() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let boss = admin(&s).await;
  let created = s.create(&ada, broken_ac()).await.unwrap();

  let updated = s
    .update_status(
      &boss,
      created.complaint_id,
      StatusUpdate {
        status:   ComplaintStatus::Resolved,
        feedback: Some("Technician replaced the compressor".into()),
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.status, ComplaintStatus::Resolved);

  let reread = s.get(&ada, created.complaint_id).await.unwrap().unwrap();
  assert_eq!(reread.status, ComplaintStatus::Resolved);
  assert_eq!(reread.feedback.as_deref(), Some("Technician replaced the compressor"));
  assert_eq!(reread.submitter_id, ada.user_id());
  assert_eq!(reread.created_at, created.created_at);
}

#[tokio::test]
async fn non_admin_status_change_is_denied() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let created = s.create(&ada, broken_ac()).await.unwrap();

  let err = s
    .update_status(&ada, created.complaint_id, ComplaintStatus::Resolved.into())
    .await
    .unwrap_err();
  assert_eq!(err.failure(), Failure::PermissionDenied);

  let reread = s.get(&ada, created.complaint_id).await.unwrap().unwrap();
  assert_eq!(reread.status, ComplaintStatus::Pending);
}

#[tokio::test]
async fn updating_a_missing_complaint_creates_nothing() {
  let s = store().await;
  let boss = admin(&s).await;
  let missing = Uuid::new_v4();

  let err = s
    .update_status(&boss, missing, ComplaintStatus::Resolved.into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ComplaintNotFound(id) if id == missing));
  assert_eq!(err.failure(), Failure::NotFound);
  assert!(s.list(&boss, &ComplaintQuery::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn resolving_twice_equals_resolving_once() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let boss = admin(&s).await;
  let created = s.create(&ada, broken_ac()).await.unwrap();

  let once = s
    .update_status(&boss, created.complaint_id, ComplaintStatus::Resolved.into())
    .await
    .unwrap();
  let twice = s
    .update_status(&boss, created.complaint_id, ComplaintStatus::Resolved.into())
    .await
    .unwrap();
  assert_eq!(once, twice);
}

#[tokio::test]
async fn feedback_is_kept_when_not_supplied() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let boss = admin(&s).await;
  let created = s.create(&ada, broken_ac()).await.unwrap();

  s.update_status(
    &boss,
    created.complaint_id,
    StatusUpdate { status: ComplaintStatus::InProgress, feedback: Some("On it".into()) },
  )
  .await
  .unwrap();
  let later = s
    .update_status(&boss, created.complaint_id, ComplaintStatus::Resolved.into())
    .await
    .unwrap();
  assert_eq!(later.feedback.as_deref(), Some("On it"));
}

// ─── Live queries ────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_all_emits_full_snapshots() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let boss = admin(&s).await;

  let mut feed = s.subscribe_all(&ada, None).unwrap();
  assert!(next_snapshot(&mut feed).await.is_empty());

  let created = s.create(&ada, broken_ac()).await.unwrap();
  let snap = next_snapshot(&mut feed).await;
  assert_eq!(snap, vec![created.clone()]);

  s.update_status(&boss, created.complaint_id, ComplaintStatus::InProgress.into())
    .await
    .unwrap();
  let snap = next_snapshot(&mut feed).await;
  assert_eq!(snap.len(), 1);
  assert_eq!(snap[0].status, ComplaintStatus::InProgress);
}

#[tokio::test]
async fn subscribe_all_respects_the_limit() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  for n in 0..4 {
    s.create(&ada, titled(&format!("c{n}"))).await.unwrap();
  }

  let mut feed = s.subscribe_all(&ada, Some(2)).unwrap();
  let snap = next_snapshot(&mut feed).await;
  let titles: Vec<_> = snap.iter().map(|c| c.title.as_str()).collect();
  assert_eq!(titles, ["c3", "c2"]);
}

#[tokio::test]
async fn subscribe_by_owner_only_sees_the_owner() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let bob = student(&s, "bob@campus.example").await;

  let mut feed = s.subscribe_by_owner(&ada, ada.user_id()).unwrap();
  assert!(next_snapshot(&mut feed).await.is_empty());

  s.create(&bob, titled("bob's")).await.unwrap();
  let mine = s.create(&ada, titled("ada's")).await.unwrap();

  // Bob's write leaves Ada's result set unchanged, so the next delivery is
  // the one containing Ada's complaint.
  let snap = next_snapshot(&mut feed).await;
  assert_eq!(snap, vec![mine]);
  assert!(snap.iter().all(|c| c.submitter_id == ada.user_id()));
}

#[tokio::test]
async fn live_query_ends_when_the_session_is_revoked() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let mut feed = s.subscribe_all(&ada, None).unwrap();
  next_snapshot(&mut feed).await;

  s.sign_out(&ada).await.unwrap();
  let other = student(&s, "bob@campus.example").await;
  s.create(&other, broken_ac()).await.unwrap();

  let item = tokio::time::timeout(Duration::from_secs(2), feed.next())
    .await
    .unwrap();
  assert!(matches!(item, Some(Err(Error::Unauthenticated))));
  let end = tokio::time::timeout(Duration::from_secs(2), feed.next())
    .await
    .unwrap();
  assert!(end.is_none());
}

#[tokio::test]
async fn live_query_redelivers_unchanged_rows_after_an_error() {
  let s = store().await;
  let ada = student(&s, "ada@campus.example").await;
  let created = s.create(&ada, broken_ac()).await.unwrap();

  let mut feed = s.subscribe_all(&ada, None).unwrap();
  assert_eq!(next_snapshot(&mut feed).await, vec![created.clone()]);

  let set_raw_status = |status: &'static str| {
    let id = crate::encode::encode_uuid(created.complaint_id);
    s.conn.call(move |conn| {
      conn.execute(
        "UPDATE complaints SET status = ?2 WHERE complaint_id = ?1",
        rusqlite::params![id, status],
      )?;
      Ok(())
    })
  };

  set_raw_status("Bogus").await.unwrap();
  s.notify();
  let item = tokio::time::timeout(Duration::from_secs(2), feed.next())
    .await
    .unwrap();
  assert!(matches!(item, Some(Err(Error::Decode { .. }))));

  set_raw_status("Pending").await.unwrap();
  s.notify();
  assert_eq!(next_snapshot(&mut feed).await, vec![created]);
}
