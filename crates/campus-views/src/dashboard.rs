//! Campus-wide overview: status counts and the most recent complaints.

use std::fmt::Display;

use campus_core::{
  Error, Result,
  auth::Authorizer,
  complaint::{Complaint, ComplaintStatus},
  store::{ComplaintFeed, ComplaintStore},
  user::Session,
};

use crate::state::{LoadState, Notice};

/// How many complaints the recent-activity preview shows.
pub const PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
  pub pending:     usize,
  pub in_progress: usize,
  pub resolved:    usize,
  pub rejected:    usize,
  pub total:       usize,
}

impl StatusCounts {
  pub fn tally(complaints: &[Complaint]) -> Self {
    complaints.iter().fold(
      Self { total: complaints.len(), ..Self::default() },
      |mut acc, c| {
        match c.status {
          ComplaintStatus::Pending => acc.pending += 1,
          ComplaintStatus::InProgress => acc.in_progress += 1,
          ComplaintStatus::Resolved => acc.resolved += 1,
          ComplaintStatus::Rejected => acc.rejected += 1,
        }
        acc
      },
    )
  }

  /// Sum of the three counters shown on the dashboard cards.
  pub fn tracked(&self) -> usize { self.pending + self.in_progress + self.resolved }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
  pub counts: StatusCounts,
  /// Newest first, at most [`PREVIEW_LEN`] entries.
  pub recent: Vec<Complaint>,
}

impl Summary {
  pub fn from_snapshot(mut complaints: Vec<Complaint>) -> Self {
    let counts = StatusCounts::tally(&complaints);
    campus_core::complaint::sort_newest_first(&mut complaints);
    complaints.truncate(PREVIEW_LEN);
    Self { counts, recent: complaints }
  }
}

#[derive(Debug)]
pub struct Dashboard {
  pub state:            LoadState<Summary>,
  /// Whether to offer the entry point to the admin console.
  pub show_admin_entry: bool,
  /// Set when a live update fails after data is already on screen.
  pub notice:           Option<Notice>,
}

impl Default for Dashboard {
  fn default() -> Self { Self::new() }
}

impl Dashboard {
  pub fn new() -> Self {
    Self { state: LoadState::Loading, show_admin_entry: false, notice: None }
  }

  /// Open the all-complaints live query this screen folds over.
  pub fn subscribe<S: ComplaintStore>(
    store: &S,
    session: &Session,
  ) -> Result<ComplaintFeed<S::Error>> {
    store.subscribe_all(session, None).map_err(Error::read)
  }

  /// Ask the authorizer whether to show the admin entry point. Failures hide
  /// it.
  pub async fn check_role<A: Authorizer>(&mut self, authorizer: &A, session: &Session) {
    self.show_admin_entry = match authorizer.role_of(session).await {
      Ok(role) => role.can_triage(),
      Err(e) => {
        tracing::warn!(error = %e, "role lookup failed");
        false
      }
    };
  }

  /// Fold one emission. The latest snapshot replaces whatever was shown.
  pub fn on_snapshot<E: Display>(&mut self, emission: Result<Vec<Complaint>, E>) {
    match emission {
      Ok(complaints) => {
        self.notice = None;
        self.state.finish(Ok(Summary::from_snapshot(complaints)));
      }
      Err(e) if self.state.loaded().is_some() => {
        self.notice = Some(Notice::failure(format!("Error: {e}")));
      }
      Err(e) => self.state.finish(Err(format!("Error loading dashboard: {e}"))),
    }
  }

  /// Await the next emission and fold it. Returns `false` once the feed ends.
  pub async fn follow<E: Display>(&mut self, feed: &mut ComplaintFeed<E>) -> bool {
    match feed.next().await {
      Some(emission) => {
        self.on_snapshot(emission);
        true
      }
      None => false,
    }
  }

  pub fn counts(&self) -> Option<StatusCounts> { self.state.loaded().map(|s| s.counts) }
}
