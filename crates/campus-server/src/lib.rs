//! Server configuration and store bootstrap for `campus-server`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use campus_store_sqlite::{FederationConfig, SqliteStore};
use config::{Environment, Source};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/campus/complaints.db";

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAMPUS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Accounts with these emails are administrators.
  #[serde(default)]
  pub admin_emails: Vec<String>,
  /// Enables `POST /api/auth/federated` when present.
  #[serde(default)]
  pub federation:   Option<FederationConfig>,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Read `path` (if it exists) layered under the environment.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  build_config(config::File::from(path).required(false))
}

/// Layer defaults, `file` and the environment, in increasing precedence.
///
/// Nested keys use a double underscore (`CAMPUS_FEDERATION__SECRET`);
/// `CAMPUS_ADMIN_EMAILS` takes a comma-separated list.
pub fn build_config(file: impl Source + Send + Sync + 'static) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .set_default("host", DEFAULT_HOST)?
    .set_default("port", i64::from(DEFAULT_PORT))?
    .set_default("store_path", DEFAULT_STORE_PATH)?
    .add_source(file)
    .add_source(
      Environment::with_prefix("CAMPUS")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("admin_emails")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Open the store described by `config` and apply its administrator list to
/// accounts that already exist.
pub async fn open_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = expand_tilde(&config.store_path);
  if let Some(dir) = store_path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create store directory {dir:?}"))?;
  }

  let mut store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_admin_emails(config.admin_emails.clone());
  if let Some(federation) = &config.federation {
    tracing::info!(provider = %federation.provider, "federated sign-in enabled");
    store = store.with_federation(federation.clone());
  }

  bootstrap_admins(&store, &config.admin_emails).await?;
  Ok(store)
}

/// Grant the administrator role to every listed email that has an account.
/// Emails without an account are granted the role when they register.
pub async fn bootstrap_admins(store: &SqliteStore, emails: &[String]) -> anyhow::Result<()> {
  for email in emails {
    let granted = store
      .grant_admin(email)
      .await
      .with_context(|| format!("failed to grant administrator role to {email}"))?;
    if !granted {
      tracing::debug!(email, "administrator not registered yet");
    }
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use campus_core::{
    auth::{AuthProvider as _, Authorizer as _},
    user::{Registration, Role},
  };
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    build_config(config::File::from_str(toml, FileFormat::Toml)).unwrap()
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = from_toml("");
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.host, DEFAULT_HOST);
    assert!(cfg.admin_emails.is_empty());
    assert!(cfg.federation.is_none());
  }

  #[test]
  fn reads_admins_and_federation() {
    let cfg = from_toml(
      r#"
        host = "0.0.0.0"
        port = 9000
        store_path = "/tmp/campus.db"
        admin_emails = ["facilities@campus.example"]

        [federation]
        provider = "google"
        issuer = "https://accounts.example"
        audience = "campus-app"
        secret = "s3cret"
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.admin_emails, ["facilities@campus.example"]);
    assert_eq!(cfg.federation.unwrap().provider, "google");
  }

  #[test]
  fn tilde_expansion() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }

  #[tokio::test]
  async fn bootstrap_promotes_existing_accounts() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let session = store
      .register(Registration {
        full_name:        "Facilities Desk".into(),
        student_id:       "STAFF-1".into(),
        email:            "facilities@campus.example".into(),
        password:         "hunter22".into(),
        confirm_password: "hunter22".into(),
      })
      .await
      .unwrap();
    assert_eq!(store.role_of(&session).await.unwrap(), Role::Student);

    let admins = vec!["facilities@campus.example".to_owned(), "nobody@campus.example".to_owned()];
    bootstrap_admins(&store, &admins).await.unwrap();
    assert_eq!(store.role_of(&session).await.unwrap(), Role::Administrator);
  }
}
