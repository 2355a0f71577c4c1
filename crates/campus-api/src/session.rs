//! Bearer-token session extractor.

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use campus_core::{auth::AuthProvider, user::Session};

use crate::error::ApiError;

/// The caller's live session. Present in a handler means the request carried
/// a valid, unrevoked bearer token.
pub struct Authenticated(pub Session);

/// The token from an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<Arc<S>> for Authenticated
where
  S: AuthProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, store: &Arc<S>) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    store
      .resolve(token)
      .await
      .map_err(ApiError::store)?
      .map(Authenticated)
      .ok_or_else(|| ApiError::Unauthorized("session expired or revoked".into()))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &'static str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
    h
  }

  #[test]
  fn parses_bearer_tokens() {
    assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
    assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer_token(&headers("Bearer ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
