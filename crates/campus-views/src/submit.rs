//! New-complaint form.

use campus_core::{
  Error, Result,
  complaint::{Complaint, ComplaintDraft},
  store::ComplaintStore,
  user::Session,
};

use crate::state::Notice;

pub const SUBMITTED: &str = "Complaint submitted successfully!";

#[derive(Debug, Default)]
pub struct SubmitForm {
  pub draft:      ComplaintDraft,
  /// True while a create is in flight.
  pub submitting: bool,
  pub notice:     Option<Notice>,
}

impl SubmitForm {
  pub fn new(draft: ComplaintDraft) -> Self { Self { draft, ..Self::default() } }

  /// Validate the draft and create it. Blank titles or descriptions are
  /// rejected before the store is contacted. On success the draft is
  /// cleared.
  pub async fn submit<S: ComplaintStore>(
    &mut self,
    store: &S,
    session: &Session,
  ) -> Result<Complaint> {
    let input = match self.draft.validate() {
      Ok(input) => input,
      Err(e) => {
        self.notice = Some(Notice::failure(e.user_message()));
        return Err(e);
      }
    };

    self.submitting = true;
    let outcome = store.create(session, input).await;
    self.submitting = false;

    match outcome {
      Ok(complaint) => {
        tracing::info!(complaint_id = %complaint.complaint_id, "complaint submitted");
        self.draft = ComplaintDraft::default();
        self.notice = Some(Notice::success(SUBMITTED));
        Ok(complaint)
      }
      Err(e) => {
        self.notice = Some(Notice::failure(format!("Error: {e}")));
        Err(Error::write(e))
      }
    }
  }
}
