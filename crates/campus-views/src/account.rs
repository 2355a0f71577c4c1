//! Sign-in and registration forms.

use campus_core::{
  Error, Result,
  auth::AuthProvider,
  user::{Credentials, FederatedCredential, Registration, Session},
};

#[derive(Default)]
pub struct LoginForm {
  pub email:    String,
  pub password: String,
  pub busy:     bool,
  pub error:    Option<String>,
}

impl LoginForm {
  pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
    Self { email: email.into(), password: password.into(), ..Self::default() }
  }

  pub async fn sign_in<A: AuthProvider>(&mut self, auth: &A) -> Result<Session> {
    let credentials =
      Credentials { email: self.email.clone(), password: self.password.clone() };
    let outcome = match credentials.validated() {
      Ok(credentials) => {
        self.busy = true;
        let outcome = auth.sign_in(credentials).await;
        self.busy = false;
        outcome.map_err(|e| Error::Auth(format!("Login failed: {e}")))
      }
      Err(e) => Err(e),
    };
    self.settle(outcome)
  }

  /// Exchange a token from an identity provider for a session.
  pub async fn sign_in_federated<A: AuthProvider>(
    &mut self,
    auth: &A,
    credential: FederatedCredential,
  ) -> Result<Session> {
    self.busy = true;
    let outcome = auth.exchange_credential(credential).await;
    self.busy = false;
    self.settle(outcome.map_err(|e| Error::Auth(format!("Federated sign-in failed: {e}"))))
  }

  fn settle(&mut self, outcome: Result<Session>) -> Result<Session> {
    self.error = outcome.as_ref().err().map(Error::user_message);
    if outcome.is_ok() {
      self.password.clear();
    }
    outcome
  }
}

#[derive(Default)]
pub struct RegisterForm {
  pub registration: Registration,
  pub busy:         bool,
  pub error:        Option<String>,
}

impl RegisterForm {
  pub fn new(registration: Registration) -> Self {
    Self { registration, ..Self::default() }
  }

  pub async fn register<A: AuthProvider>(&mut self, auth: &A) -> Result<Session> {
    let outcome = match self.registration.clone().validated() {
      Ok(registration) => {
        self.busy = true;
        let outcome = auth.register(registration).await;
        self.busy = false;
        outcome.map_err(|e| Error::Auth(format!("Registration failed: {e}")))
      }
      Err(e) => Err(e),
    };
    self.error = outcome.as_ref().err().map(Error::user_message);
    outcome
  }
}

/// Revoke `session`. The caller drops it afterwards.
pub async fn sign_out<A: AuthProvider>(auth: &A, session: &Session) -> Result<()> {
  auth
    .sign_out(session)
    .await
    .map_err(|e| Error::Auth(format!("Sign-out failed: {e}")))
}

#[cfg(test)]
mod tests {
  use campus_core::auth::AuthProvider as _;

  use super::*;
  use crate::testing;

  fn registration(email: &str) -> Registration {
    Registration {
      full_name:        "Test Student".into(),
      student_id:       "S-0001".into(),
      email:            email.into(),
      password:         "hunter22".into(),
      confirm_password: "hunter22".into(),
    }
  }

  #[tokio::test]
  async fn register_then_login() {
    let store = testing::store().await;

    let mut form = RegisterForm::new(registration("alice@campus.example"));
    let session = form.register(&store).await.unwrap();
    assert!(form.error.is_none());
    assert_eq!(session.user.display_name.as_deref(), Some("Test Student"));

    let mut login = LoginForm::new("alice@campus.example", "hunter22");
    let again = login.sign_in(&store).await.unwrap();
    assert_eq!(again.user_id(), session.user_id());
    assert!(login.password.is_empty());
    assert!(store.resolve(&again.token).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn validation_messages() {
    let store = testing::store().await;

    let mut login = LoginForm::new("alice@campus.example", "");
    assert!(login.sign_in(&store).await.err().unwrap().is_validation());
    assert_eq!(login.error.as_deref(), Some(Credentials::MISSING_FIELDS));

    let mut form = RegisterForm::new(Registration {
      confirm_password: "hunter23".into(),
      ..registration("alice@campus.example")
    });
    assert!(form.register(&store).await.err().unwrap().is_validation());
    assert_eq!(form.error.as_deref(), Some(Registration::PASSWORD_MISMATCH));
  }

  #[tokio::test]
  async fn wrong_password_is_an_auth_error() {
    let store = testing::store().await;
    testing::student(&store, "alice@campus.example").await;

    let mut login = LoginForm::new("alice@campus.example", "wrong");
    let err = login.sign_in(&store).await.err().unwrap();
    assert!(matches!(err, Error::Auth(_)));
    assert!(login.error.unwrap().starts_with("Login failed: "));
  }

  #[tokio::test]
  async fn sign_out_revokes() {
    let store = testing::store().await;
    let alice = testing::student(&store, "alice@campus.example").await;

    sign_out(&store, &alice).await.unwrap();
    assert!(store.resolve(&alice.token).await.unwrap().is_none());
    // Twice is fine.
    sign_out(&store, &alice).await.unwrap();
  }
}
