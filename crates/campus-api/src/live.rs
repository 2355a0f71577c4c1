//! `GET /complaints/live` — a live query as a Server-Sent-Events stream.
//!
//! Each emission of the underlying subscription becomes one `snapshot` event
//! whose data is the full JSON array of matching complaints. Failed
//! emissions become `error` events. The stream ends when the subscription
//! does, e.g. after the session is revoked.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
  extract::{Query, State},
  response::sse::{Event, KeepAlive, Sse},
};
use campus_core::{
  complaint::Complaint,
  store::{ComplaintQuery, ComplaintStore},
};
use futures_util::stream::{self, Stream};
use serde_json::json;

use crate::{Backend, error::ApiError, session::Authenticated};

pub const SNAPSHOT_EVENT: &str = "snapshot";
pub const ERROR_EVENT: &str = "error";

const KEEP_ALIVE: Duration = Duration::from_secs(15);

fn to_event<E: std::fmt::Display>(emission: Result<Vec<Complaint>, E>) -> Event {
  match emission {
    Ok(complaints) => Event::default()
      .event(SNAPSHOT_EVENT)
      .json_data(&complaints)
      .unwrap_or_else(|e| {
        Event::default().event(ERROR_EVENT).data(json!({ "error": e.to_string() }).to_string())
      }),
    Err(e) => Event::default()
      .event(ERROR_EVENT)
      .data(json!({ "error": e.to_string() }).to_string()),
  }
}

/// `GET /complaints/live[?owner=&status=&limit=]`
pub async fn handler<S: Backend>(
  State(store): State<Arc<S>>,
  Authenticated(session): Authenticated,
  Query(query): Query<ComplaintQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
  let feed = ComplaintStore::subscribe(store.as_ref(), &session, query)
    .map_err(ApiError::store)?;
  tracing::debug!(user_id = %session.user_id(), "live stream opened");

  // Dropping the stream drops the feed, which stops its producer.
  let events = stream::unfold(feed, |mut feed| async move {
    let emission = feed.next().await?;
    Some((Ok(to_event(emission)), feed))
  });

  Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE)))
}
