//! The signed-in user's own complaints.

use campus_core::{
  Error, Result,
  complaint::{Complaint, sort_newest_first},
  store::{ComplaintQuery, ComplaintStore},
  user::Session,
};

use crate::state::LoadState;

#[derive(Debug)]
pub struct MyComplaints {
  pub state: LoadState<Vec<Complaint>>,
}

impl Default for MyComplaints {
  fn default() -> Self { Self::new() }
}

impl MyComplaints {
  pub fn new() -> Self { Self { state: LoadState::Loading } }

  /// One-shot read of the caller's complaints, newest first.
  ///
  /// The outcome is recorded in [`Self::state`]; the error is also returned
  /// so callers without a screen can report it.
  pub async fn load<S: ComplaintStore>(&mut self, store: &S, session: &Session) -> Result<()> {
    self.state.begin();
    let query = ComplaintQuery::by_owner(session.user_id());

    match store.list(session, &query).await {
      Ok(mut complaints) => {
        sort_newest_first(&mut complaints);
        self.state.finish(Ok(complaints));
        Ok(())
      }
      Err(e) => {
        tracing::warn!(error = %e, "loading own complaints failed");
        self.state.finish(Err(format!("Error loading complaints: {e}")));
        Err(Error::read(e))
      }
    }
  }

  pub async fn retry<S: ComplaintStore>(&mut self, store: &S, session: &Session) -> Result<()> {
    self.load(store, session).await
  }

  /// Loaded with nothing to show.
  pub fn is_empty(&self) -> bool { self.state.loaded().is_some_and(Vec::is_empty) }

  pub fn complaints(&self) -> &[Complaint] {
    self.state.loaded().map(Vec::as_slice).unwrap_or_default()
  }
}
