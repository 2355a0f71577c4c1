//! Accounts, sessions, roles and identity federation.
//!
//! Passwords are stored as argon2 PHC strings. Session tokens are 32 random
//! bytes handed to the client as URL-safe base64; only their SHA-256 digest is
//! persisted. Federated ID tokens are HS256 JWTs signed by the configured
//! issuer.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{SubsecRound as _, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use campus_core::{
  auth::{AuthProvider, Authorizer},
  user::{Credentials, FederatedCredential, Registration, Role, Session, User},
};

use crate::{
  Error, Result, SqliteStore,
  encode::{RawUser, USER_COLUMNS, decode_role, encode_dt, encode_role, encode_uuid},
};

// ─── Federation ──────────────────────────────────────────────────────────────

/// Trust settings for federated sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct FederationConfig {
  /// Provider name clients must send, e.g. `"google"`.
  pub provider: String,
  /// Expected `iss` claim.
  pub issuer:   String,
  /// Expected `aud` claim (the client id registered with the provider).
  pub audience: String,
  /// HS256 shared secret.
  pub secret:   String,
}

/// Claims read from a federated ID token.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IdClaims {
  pub sub:   String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub name:  Option<String>,
  pub iss:   String,
  pub aud:   String,
  pub exp:   u64,
}

// ─── Token and password helpers ──────────────────────────────────────────────

fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

// ─── Internal queries ────────────────────────────────────────────────────────

impl SqliteStore {
  /// Resolve the session's token to its user, failing with
  /// [`Error::Unauthenticated`] for unknown or revoked tokens.
  pub(crate) async fn authenticate(&self, session: &Session) -> Result<User> {
    self
      .user_for_token(&session.token)
      .await?
      .ok_or(Error::Unauthenticated)
  }

  async fn user_for_token(&self, token: &str) -> Result<Option<User>> {
    let digest = token_digest(token);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS}
                 FROM sessions s JOIN users u ON u.user_id = s.user_id
                 WHERE s.token_hash = ?1"
              ),
              rusqlite::params![digest],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  /// Look up a user by email (case-insensitive) with their password hash.
  async fn user_by_email(&self, email: &str) -> Result<Option<(User, Option<String>)>> {
    let email = email.to_owned();

    let row: Option<(RawUser, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.email = ?1"),
              rusqlite::params![email],
              |row| Ok((RawUser::from_row(row)?, row.get(5)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(raw, hash)| Ok((raw.into_user()?, hash)))
      .transpose()
  }

  async fn insert_user(&self, user: &User, password_hash: Option<String>) -> Result<()> {
    let id_str       = encode_uuid(user.user_id);
    let email        = user.email.clone();
    let display_name = user.display_name.clone();
    let student_id   = user.student_id.clone();
    let created_str  = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO users (user_id, email, password_hash, display_name, student_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, email, password_hash, display_name, student_id, created_str],
        );
        match res {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if inserted {
      Ok(())
    } else {
      Err(Error::EmailTaken(user.email.clone().unwrap_or_default()))
    }
  }

  async fn issue_session(&self, user: User) -> Result<Session> {
    let token  = new_token();
    let issued = Utc::now().trunc_subsecs(6);

    let digest     = token_digest(&token);
    let user_str   = encode_uuid(user.user_id);
    let issued_str = encode_dt(issued);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, issued_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![digest, user_str, issued_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Session { user, token, issued_at: issued })
  }

  pub(crate) async fn role_of_user(&self, user_id: Uuid) -> Result<Role> {
    let id_str = encode_uuid(user_id);

    let role: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT role FROM roles WHERE user_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    role.as_deref().map_or(Ok(Role::Student), decode_role)
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<()> {
    let id_str   = encode_uuid(user_id);
    let role_str = encode_role(role);
    let at_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO roles (user_id, role, granted_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(user_id) DO UPDATE SET role = excluded.role, granted_at = excluded.granted_at",
          rusqlite::params![id_str, role_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Grant the administrator role to the account registered under `email`.
  /// Returns `false` when no such account exists yet.
  pub async fn grant_admin(&self, email: &str) -> Result<bool> {
    match self.user_by_email(email).await? {
      Some((user, _)) => {
        self.set_role(user.user_id, Role::Administrator).await?;
        tracing::info!(email, user_id = %user.user_id, "granted administrator role");
        Ok(true)
      }
      None => Ok(false),
    }
  }

  fn is_bootstrap_admin(&self, email: &str) -> bool {
    self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email))
  }

  fn decode_id_token(&self, credential: &FederatedCredential) -> Result<IdClaims> {
    let config = self.federation.as_deref().ok_or(Error::FederationDisabled)?;
    if credential.provider != config.provider {
      return Err(Error::FederationRejected(format!(
        "unknown provider {:?}",
        credential.provider
      )));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    jsonwebtoken::decode::<IdClaims>(
      &credential.id_token,
      &DecodingKey::from_secret(config.secret.as_bytes()),
      &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| Error::FederationRejected(e.to_string()))
  }

  async fn linked_user(&self, provider: &str, subject: &str) -> Result<Option<User>> {
    let provider = provider.to_owned();
    let subject  = subject.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS}
                 FROM federated_identities f JOIN users u ON u.user_id = f.user_id
                 WHERE f.provider = ?1 AND f.subject = ?2"
              ),
              rusqlite::params![provider, subject],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn link_identity(&self, provider: &str, subject: &str, user_id: Uuid) -> Result<()> {
    let provider = provider.to_owned();
    let subject  = subject.to_owned();
    let user_str = encode_uuid(user_id);
    let at_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO federated_identities (provider, subject, user_id, linked_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![provider, subject, user_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AuthProvider impl ───────────────────────────────────────────────────────

impl AuthProvider for SqliteStore {
  type Error = Error;

  async fn register(&self, registration: Registration) -> Result<Session> {
    let registration = registration
      .validated()
      .map_err(|e| Error::Invalid(e.user_message()))?;

    let user = User {
      user_id:      Uuid::new_v4(),
      email:        Some(registration.email.clone()),
      display_name: Some(registration.full_name),
      student_id:   Some(registration.student_id),
      created_at:   Utc::now().trunc_subsecs(6),
    };
    let hash = hash_password(&registration.password)?;
    self.insert_user(&user, Some(hash)).await?;

    if self.is_bootstrap_admin(&registration.email) {
      self.set_role(user.user_id, Role::Administrator).await?;
      tracing::info!(email = %registration.email, "registered bootstrap administrator");
    }

    self.issue_session(user).await
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
    let credentials = credentials
      .validated()
      .map_err(|e| Error::Invalid(e.user_message()))?;

    let Some((user, Some(hash))) = self.user_by_email(&credentials.email).await? else {
      tracing::warn!(email = %credentials.email, "sign-in for unknown or passwordless account");
      return Err(Error::InvalidCredentials);
    };
    if !verify_password(&credentials.password, &hash) {
      tracing::warn!(email = %credentials.email, "sign-in with wrong password");
      return Err(Error::InvalidCredentials);
    }

    self.issue_session(user).await
  }

  async fn exchange_credential(&self, credential: FederatedCredential) -> Result<Session> {
    let claims = self.decode_id_token(&credential).inspect_err(|e| {
      tracing::warn!(provider = %credential.provider, error = %e, "federated token refused");
    })?;

    if let Some(user) = self.linked_user(&credential.provider, &claims.sub).await? {
      return self.issue_session(user).await;
    }

    // First sign-in through this identity: reuse an account with the same
    // email, otherwise create a passwordless one.
    let existing = match claims.email.as_deref() {
      Some(email) => self.user_by_email(email).await?.map(|(user, _)| user),
      None => None,
    };
    let user = match existing {
      Some(user) => user,
      None => {
        let user = User {
          user_id:      Uuid::new_v4(),
          email:        claims.email.clone(),
          display_name: claims.name.clone(),
          student_id:   None,
          created_at:   Utc::now().trunc_subsecs(6),
        };
        self.insert_user(&user, None).await?;
        if claims.email.as_deref().is_some_and(|e| self.is_bootstrap_admin(e)) {
          self.set_role(user.user_id, Role::Administrator).await?;
        }
        user
      }
    };

    self.link_identity(&credential.provider, &claims.sub, user.user_id).await?;
    self.issue_session(user).await
  }

  async fn sign_out(&self, session: &Session) -> Result<()> {
    let digest = token_digest(&session.token);

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token_hash = ?1", rusqlite::params![digest])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn resolve(&self, token: &str) -> Result<Option<Session>> {
    let digest = token_digest(token);

    let row: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS}, s.issued_at
                 FROM sessions s JOIN users u ON u.user_id = s.user_id
                 WHERE s.token_hash = ?1"
              ),
              rusqlite::params![digest],
              |row| Ok((RawUser::from_row(row)?, row.get(5)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((raw, issued)) = row else { return Ok(None) };
    Ok(Some(Session {
      user:      raw.into_user()?,
      token:     token.to_owned(),
      issued_at: crate::encode::decode_dt(&issued)?,
    }))
  }
}

// ─── Authorizer impl ─────────────────────────────────────────────────────────

impl Authorizer for SqliteStore {
  type Error = Error;

  async fn role_of(&self, session: &Session) -> Result<Role> {
    let user = self.authenticate(session).await?;
    self.role_of_user(user.user_id).await
  }
}
