//! Administrator console: the live list of every complaint plus status
//! changes.

use std::fmt::Display;

use campus_core::{
  Error, Result,
  auth::Authorizer,
  complaint::{Complaint, ComplaintStatus},
  store::{ComplaintFeed, ComplaintStore, StatusUpdate},
  user::Session,
};
use uuid::Uuid;

use crate::state::{LoadState, Notice};

pub const ACCESS_DENIED: &str = "Access denied. Administrators only.";

/// Status changes the console offers for a complaint currently in `status`.
pub fn transitions_for(status: ComplaintStatus) -> &'static [ComplaintStatus] {
  use ComplaintStatus::*;
  match status {
    Pending => &[InProgress, Resolved, Rejected],
    Resolved => &[],
    InProgress | Rejected => &[Resolved, Rejected],
  }
}

#[derive(Debug)]
pub struct AdminConsole {
  pub state:  LoadState<Vec<Complaint>>,
  pub notice: Option<Notice>,
}

impl AdminConsole {
  /// Enter the console. Only sessions whose role may triage get one.
  pub async fn mount<A: Authorizer>(authorizer: &A, session: &Session) -> Result<Self> {
    let role = authorizer
      .role_of(session)
      .await
      .map_err(|e| Error::Auth(e.to_string()))?;
    if !role.can_triage() {
      tracing::warn!(user_id = %session.user_id(), "admin console refused");
      return Err(Error::Auth(ACCESS_DENIED.to_owned()));
    }
    Ok(Self { state: LoadState::Loading, notice: None })
  }

  pub fn subscribe<S: ComplaintStore>(
    &self,
    store: &S,
    session: &Session,
  ) -> Result<ComplaintFeed<S::Error>> {
    store.subscribe_all(session, None).map_err(Error::read)
  }

  pub fn on_snapshot<E: Display>(&mut self, emission: Result<Vec<Complaint>, E>) {
    match emission {
      Ok(complaints) => {
        if self.notice.as_ref().is_some_and(Notice::is_failure) {
          self.notice = None;
        }
        self.state.finish(Ok(complaints));
      }
      // Keep the list on screen; report the failure alongside it.
      Err(e) if self.state.loaded().is_some() => {
        self.notice = Some(Notice::failure(format!("Error: {e}")));
      }
      Err(e) => self.state.finish(Err(format!("Error loading complaints: {e}"))),
    }
  }

  pub async fn follow<E: Display>(&mut self, feed: &mut ComplaintFeed<E>) -> bool {
    match feed.next().await {
      Some(emission) => {
        self.on_snapshot(emission);
        true
      }
      None => false,
    }
  }

  pub fn complaint(&self, id: Uuid) -> Option<&Complaint> {
    self.state.loaded()?.iter().find(|c| c.complaint_id == id)
  }

  /// Change a complaint's status and post a notice with the outcome.
  ///
  /// When the complaint is on screen, only the transitions offered by
  /// [`transitions_for`] are accepted. On failure the displayed list is left
  /// as it was.
  pub async fn update_status<S: ComplaintStore>(
    &mut self,
    store: &S,
    session: &Session,
    id: Uuid,
    update: StatusUpdate,
  ) -> Result<Complaint> {
    if let Some(current) = self.complaint(id).map(|c| c.status)
      && !transitions_for(current).contains(&update.status)
    {
      let message = format!("Cannot change status from {current} to {}", update.status);
      self.notice = Some(Notice::failure(format!("Error: {message}")));
      return Err(Error::validation(message));
    }

    let status = update.status;
    match store.update_status(session, id, update).await {
      Ok(updated) => {
        self.notice = Some(Notice::success(format!("Status updated to {status}")));
        // The live feed will deliver the same change; patch now so the
        // result shows without one.
        if let Some(row) = self
          .state
          .loaded_mut()
          .and_then(|rows| rows.iter_mut().find(|c| c.complaint_id == id))
        {
          *row = updated.clone();
        }
        Ok(updated)
      }
      Err(e) => {
        self.notice = Some(Notice::failure(format!("Error: {e}")));
        Err(Error::write(e))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use campus_core::store::ComplaintStore as _;

  use super::*;
  use crate::{state::NoticeKind, testing};

  #[test]
  fn offered_transitions() {
    use ComplaintStatus::*;
    assert_eq!(transitions_for(Pending), &[InProgress, Resolved, Rejected]);
    assert_eq!(transitions_for(InProgress), &[Resolved, Rejected]);
    assert_eq!(transitions_for(Rejected), &[Resolved, Rejected]);
    assert!(transitions_for(Resolved).is_empty());
  }

  #[tokio::test]
  async fn students_are_refused() {
    let store = testing::store().await;
    let alice = testing::student(&store, "alice@campus.example").await;

    let err = AdminConsole::mount(&store, &alice).await.unwrap_err();
    assert!(matches!(err, Error::Auth(ref m) if m == ACCESS_DENIED));
  }

  #[tokio::test]
  async fn resolve_pending_complaint() {
    let store = testing::store().await;
    let alice = testing::student(&store, "alice@campus.example").await;
    let admin = testing::admin(&store).await;
    let filed = testing::file(&store, &alice, "Broken AC").await;

    let mut console = AdminConsole::mount(&store, &admin).await.unwrap();
    let mut feed = console.subscribe(&store, &admin).unwrap();
    assert!(console.follow(&mut feed).await);
    assert_eq!(console.complaint(filed.complaint_id).unwrap().status, ComplaintStatus::Pending);

    let updated = console
      .update_status(&store, &admin, filed.complaint_id, ComplaintStatus::Resolved.into())
      .await
      .unwrap();
    assert_eq!(updated.status, ComplaintStatus::Resolved);
    assert_eq!(
      console.notice,
      Some(Notice::success("Status updated to Resolved"))
    );
    assert_eq!(console.complaint(filed.complaint_id).unwrap().status, ComplaintStatus::Resolved);

    let reread = store.get(&alice, filed.complaint_id).await.unwrap().unwrap();
    assert_eq!(reread.status, ComplaintStatus::Resolved);

    // The live feed converges on the same state.
    console.on_snapshot(testing::next(&mut feed).await);
    assert_eq!(console.complaint(filed.complaint_id).unwrap().status, ComplaintStatus::Resolved);
  }

  #[tokio::test]
  async fn resolved_complaints_offer_nothing() {
    let store = testing::store().await;
    let alice = testing::student(&store, "alice@campus.example").await;
    let admin = testing::admin(&store).await;
    let filed = testing::file(&store, &alice, "Leaky tap").await;
    store
      .update_status(&admin, filed.complaint_id, ComplaintStatus::Resolved.into())
      .await
      .unwrap();

    let mut console = AdminConsole::mount(&store, &admin).await.unwrap();
    let mut feed = console.subscribe(&store, &admin).unwrap();
    console.on_snapshot(testing::next(&mut feed).await);

    let err = console
      .update_status(&store, &admin, filed.complaint_id, ComplaintStatus::Rejected.into())
      .await
      .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(console.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Failure));
  }

  #[tokio::test]
  async fn failed_write_keeps_the_list() {
    let store = testing::store().await;
    let alice = testing::student(&store, "alice@campus.example").await;
    let admin = testing::admin(&store).await;
    testing::file(&store, &alice, "Broken AC").await;

    let mut console = AdminConsole::mount(&store, &admin).await.unwrap();
    let mut feed = console.subscribe(&store, &admin).unwrap();
    console.on_snapshot(testing::next(&mut feed).await);
    let before = console.state.clone();

    let missing = Uuid::new_v4();
    let err = console
      .update_status(&store, &admin, missing, ComplaintStatus::Resolved.into())
      .await
      .unwrap_err();
    assert!(err.is_write());
    assert!(console.notice.as_ref().unwrap().message.starts_with("Error: "));
    assert_eq!(console.state, before);
    assert!(store.get(&admin, missing).await.unwrap().is_none());
  }

  #[test]
  fn recovered_feed_clears_the_failure_notice() {
    let mut console = AdminConsole { state: LoadState::Loading, notice: None };
    console.on_snapshot::<&str>(Ok(Vec::new()));
    console.on_snapshot::<&str>(Err("offline"));
    assert!(console.notice.as_ref().is_some_and(Notice::is_failure));

    console.on_snapshot::<&str>(Ok(Vec::new()));
    assert_eq!(console.notice, None);

    console.notice = Some(Notice::success("Status updated to Resolved"));
    console.on_snapshot::<&str>(Ok(Vec::new()));
    assert_eq!(console.notice, Some(Notice::success("Status updated to Resolved")));
  }

  #[tokio::test]
  async fn store_rejects_students_even_without_the_gate() {
    let store = testing::store().await;
    let alice = testing::student(&store, "alice@campus.example").await;
    let filed = testing::file(&store, &alice, "Broken AC").await;

    // Bypass `mount` to show the store enforces the rule on its own.
    let mut console = AdminConsole { state: LoadState::Loading, notice: None };
    let err = console
      .update_status(&store, &alice, filed.complaint_id, ComplaintStatus::Resolved.into())
      .await
      .unwrap_err();
    assert!(err.is_write());

    let reread = store.get(&alice, filed.complaint_id).await.unwrap().unwrap();
    assert_eq!(reread.status, ComplaintStatus::Pending);
  }
}
