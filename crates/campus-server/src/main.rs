//! campus-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the complaints API over HTTP.
//!
//! # Granting the administrator role
//!
//! ```text
//! campus-server --grant-admin facilities@campus.example
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use campus_server::{load_config, open_store};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Campus complaints server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Make the account registered under this email an administrator and exit.
  #[arg(long, value_name = "EMAIL")]
  grant_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = load_config(&cli.config)?;
  let store = open_store(&server_cfg).await?;

  // Helper mode: grant the role and exit.
  if let Some(email) = cli.grant_admin {
    if !store.grant_admin(&email).await? {
      anyhow::bail!("no account is registered under {email}");
    }
    println!("{email} is now an administrator");
    return Ok(());
  }

  let app = campus_api::app(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
