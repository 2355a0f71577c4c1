//! Authentication and authorization collaborators.
//!
//! [`AuthProvider`] turns credentials into a [`Session`]. [`Authorizer`]
//! answers capability questions about a session; it replaces any notion of a
//! hardcoded administrator address.

use std::future::Future;

use crate::{
  store::StoreFailure,
  user::{Credentials, FederatedCredential, Registration, Role, Session},
};

pub trait AuthProvider: Send + Sync {
  type Error: std::error::Error + StoreFailure + Send + Sync + 'static;

  /// Create an email/password account and sign it in.
  fn register(
    &self,
    registration: Registration,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn sign_in(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Exchange a federated identity token for a local session, creating the
  /// local account on first use.
  fn exchange_credential(
    &self,
    credential: FederatedCredential,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Revoke the session's token. Signing out twice is not an error.
  fn sign_out<'a>(
    &'a self,
    session: &'a Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Look up the live session for a bearer token. Returns `None` for unknown
  /// or revoked tokens.
  fn resolve<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;
}

pub trait Authorizer: Send + Sync {
  type Error: std::error::Error + StoreFailure + Send + Sync + 'static;

  fn role_of<'a>(
    &'a self,
    session: &'a Session,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + 'a;
}
