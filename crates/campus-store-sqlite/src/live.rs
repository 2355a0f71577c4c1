//! Live queries.
//!
//! Each subscription is a task that re-runs its query whenever a write
//! signals the store's change channel and forwards the full result set.
//! Identical consecutive snapshots are not re-delivered.

use campus_core::{
  store::{ComplaintFeed, ComplaintQuery, Failure, StoreFailure as _},
  subscription::{DEFAULT_CAPACITY, Subscription},
  user::Session,
};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::SqliteStore;

pub fn spawn_feed(
  store: SqliteStore,
  session: Session,
  query: ComplaintQuery,
) -> ComplaintFeed<crate::Error> {
  // Subscribe before the first read so no write can slip in between.
  let mut changes = store.changes.subscribe();

  Subscription::spawn(DEFAULT_CAPACITY, move |emitter| async move {
    tracing::debug!(?query, user_id = %session.user_id(), "live query started");
    let mut last = None;

    loop {
      let snapshot = match store.authenticate(&session).await {
        Ok(_) => store.select(&query).await,
        Err(e) => Err(e),
      };

      let revoked =
        matches!(&snapshot, Err(e) if e.failure() == Failure::Unauthenticated);

      match snapshot {
        Ok(rows) if last.as_ref() == Some(&rows) => {}
        Ok(rows) => {
          last = Some(rows.clone());
          if !emitter.emit(Ok(rows)).await {
            break;
          }
        }
        Err(e) => {
          // The consumer's last view is now the error; redeliver on recovery.
          last = None;
          if !emitter.emit(Err(e)).await || revoked {
            break;
          }
        }
      }

      match changes.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => break,
      }
      // Collapse a burst of writes into a single re-query.
      loop {
        match changes.try_recv() {
          Ok(()) | Err(TryRecvError::Lagged(_)) => continue,
          Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
      }
    }

    tracing::debug!(?query, "live query stopped");
  })
}
