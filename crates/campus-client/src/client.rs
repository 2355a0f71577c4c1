//! [`HttpClient`]: the campus API as a [`ComplaintStore`], [`AuthProvider`]
//! and [`Authorizer`].

use std::time::Duration;

use campus_core::{
  auth::{AuthProvider, Authorizer},
  complaint::{Complaint, NewComplaint},
  store::{ComplaintFeed, ComplaintQuery, ComplaintStore, StatusUpdate},
  subscription::{DEFAULT_CAPACITY, Emitter, Subscription},
  user::{Credentials, FederatedCredential, Registration, Role, Session, User},
};
use chrono::{DateTime, Utc};
use eventsource_stream::{Event, Eventsource as _};
use futures_util::StreamExt as _;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const DEFAULT_URL: &str = "http://localhost:8080";

/// Applied to every request except live streams, which stay open.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Me {
  user:      User,
  role:      Role,
  issued_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the campus JSON API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpClient {
  client:   Client,
  base_url: String,
}

impl HttpClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = req.timeout(REQUEST_TIMEOUT).send().await?;
    Ok(checked(resp).await?.json().await?)
  }

  async fn me(&self, token: &str) -> Result<Me> {
    Self::send(self.client.get(self.url("/auth/me")).bearer_auth(token)).await
  }
}

/// Turn a non-success response into [`Error::Api`] carrying the server's
/// message.
async fn checked(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let text = resp.text().await.unwrap_or_default();
  let message = serde_json::from_str::<ErrorBody>(&text)
    .map(|b| b.error)
    .unwrap_or_else(|_| if text.is_empty() { status.to_string() } else { text });
  Err(Error::Api { status, message })
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for HttpClient {
  type Error = Error;

  async fn create(&self, session: &Session, input: NewComplaint) -> Result<Complaint> {
    Self::send(
      self
        .client
        .post(self.url("/complaints"))
        .bearer_auth(&session.token)
        .json(&input),
    )
    .await
  }

  async fn get(&self, session: &Session, id: Uuid) -> Result<Option<Complaint>> {
    let req = self
      .client
      .get(self.url(&format!("/complaints/{id}")))
      .bearer_auth(&session.token);
    match Self::send(req).await {
      Ok(complaint) => Ok(Some(complaint)),
      Err(Error::Api { status: StatusCode::NOT_FOUND, .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn list(&self, session: &Session, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    Self::send(
      self
        .client
        .get(self.url("/complaints"))
        .bearer_auth(&session.token)
        .query(query),
    )
    .await
  }

  async fn update_status(
    &self,
    session: &Session,
    id: Uuid,
    update: StatusUpdate,
  ) -> Result<Complaint> {
    Self::send(
      self
        .client
        .patch(self.url(&format!("/complaints/{id}/status")))
        .bearer_auth(&session.token)
        .json(&update),
    )
    .await
  }

  fn subscribe(&self, session: &Session, query: ComplaintQuery) -> Result<ComplaintFeed<Error>> {
    let req = self
      .client
      .get(self.url("/complaints/live"))
      .bearer_auth(&session.token)
      .query(&query);
    Ok(Subscription::spawn(DEFAULT_CAPACITY, move |emitter| follow_stream(req, emitter)))
  }
}

/// Producer for a live query: forward each `snapshot` event until the
/// server closes the stream or the consumer goes away.
async fn follow_stream(req: RequestBuilder, emitter: Emitter<Vec<Complaint>, Error>) {
  let resp = match req.send().await.map_err(Error::from) {
    Ok(resp) => checked(resp).await,
    Err(e) => Err(e),
  };
  let resp = match resp {
    Ok(resp) => resp,
    Err(e) => {
      emitter.emit(Err(e)).await;
      return;
    }
  };

  let mut events = resp.bytes_stream().eventsource();
  while let Some(event) = events.next().await {
    let emission = match event {
      Ok(event) => match live_emission(event) {
        Some(emission) => emission,
        None => continue,
      },
      Err(e) => {
        emitter.emit(Err(e.into())).await;
        return;
      }
    };
    if !emitter.emit(emission).await {
      return;
    }
  }
  tracing::debug!("live stream closed by server");
}

/// Map a decoded live event to an emission. Unknown events are skipped.
fn live_emission(event: Event) -> Option<Result<Vec<Complaint>>> {
  match event.event.as_str() {
    "snapshot" => Some(serde_json::from_str(&event.data).map_err(Error::from)),
    "error" => Some(Err(Error::Remote(
      serde_json::from_str::<ErrorBody>(&event.data)
        .map(|b| b.error)
        .unwrap_or(event.data),
    ))),
    other => {
      tracing::debug!(event = other, "ignoring unknown live event");
      None
    }
  }
}

// ─── AuthProvider impl ───────────────────────────────────────────────────────

impl AuthProvider for HttpClient {
  type Error = Error;

  async fn register(&self, registration: Registration) -> Result<Session> {
    Self::send(self.client.post(self.url("/auth/register")).json(&registration)).await
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
    Self::send(self.client.post(self.url("/auth/login")).json(&credentials)).await
  }

  async fn exchange_credential(&self, credential: FederatedCredential) -> Result<Session> {
    Self::send(self.client.post(self.url("/auth/federated")).json(&credential)).await
  }

  async fn sign_out(&self, session: &Session) -> Result<()> {
    let resp = self
      .client
      .post(self.url("/auth/logout"))
      .bearer_auth(&session.token)
      .timeout(REQUEST_TIMEOUT)
      .send()
      .await?;
    match checked(resp).await {
      // Already revoked.
      Ok(_) | Err(Error::Api { status: StatusCode::UNAUTHORIZED, .. }) => Ok(()),
      Err(e) => Err(e),
    }
  }

  async fn resolve(&self, token: &str) -> Result<Option<Session>> {
    match self.me(token).await {
      Ok(me) => Ok(Some(Session {
        user:      me.user,
        token:     token.to_owned(),
        issued_at: me.issued_at,
      })),
      Err(Error::Api { status: StatusCode::UNAUTHORIZED, .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }
}

// ─── Authorizer impl ─────────────────────────────────────────────────────────

impl Authorizer for HttpClient {
  type Error = Error;

  async fn role_of(&self, session: &Session) -> Result<Role> {
    Ok(self.me(&session.token).await?.role)
  }
}
