//! `campus` — command-line client for the campus complaints server.
//!
//! # Usage
//!
//! ```text
//! campus --url http://localhost:8080 login --email ada@campus.example --password …
//! campus submit --title "Broken AC" --description "No cooling in room 204"
//! campus dashboard --watch
//! ```

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use campus_client::{
  DEFAULT_URL, HttpClient,
  settings::{ConfigFile, SessionFile, config_dir, default_session_file},
};
use campus_core::complaint::{ComplaintStatus, Priority};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", version, about = "Campus complaint tracker client")]
struct Args {
  /// Path to a TOML config file (url, session_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the campus server (default: http://localhost:8080).
  #[arg(long, env = "CAMPUS_URL")]
  url: Option<String>,

  /// Where the signed-in session is stored.
  #[arg(long, env = "CAMPUS_SESSION_FILE", value_name = "FILE")]
  session_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account and sign in.
  Register {
    #[arg(long)]
    name:       String,
    #[arg(long)]
    student_id: String,
    #[arg(long)]
    email:      String,
    #[arg(long, env = "CAMPUS_PASSWORD")]
    password:   String,
    /// Defaults to `--password`.
    #[arg(long)]
    confirm:    Option<String>,
  },
  /// Sign in with email and password, or with a federated ID token.
  Login {
    #[arg(long, required_unless_present = "id_token")]
    email:    Option<String>,
    #[arg(long, env = "CAMPUS_PASSWORD")]
    password: Option<String>,
    /// Identity provider that issued `--id-token`.
    #[arg(long, requires = "id_token")]
    provider: Option<String>,
    #[arg(long)]
    id_token: Option<String>,
  },
  /// Revoke the stored session.
  Logout,
  /// Show the signed-in account and its role.
  Whoami,
  /// File a new complaint.
  Submit {
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "")]
    category:    String,
    #[arg(long, default_value = "")]
    location:    String,
    #[arg(long, default_value = "")]
    contact:     String,
    #[arg(long, default_value_t = Priority::Medium)]
    priority:    Priority,
  },
  /// List your own complaints, newest first.
  Mine,
  /// Campus-wide status counts and recent complaints.
  Dashboard {
    /// Keep printing as complaints change, until interrupted.
    #[arg(long)]
    watch: bool,
  },
  /// Every complaint with the status changes on offer (administrators).
  Admin {
    #[arg(long)]
    watch: bool,
  },
  /// Change a complaint's status (administrators).
  SetStatus {
    id:       Uuid,
    /// Pending, "In Progress", Resolved or Rejected.
    status:   ComplaintStatus,
    /// Note shown to the submitter.
    #[arg(long)]
    feedback: Option<String>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Load config file if provided, else the default location if it exists.
  let file_cfg = match &args.config {
    Some(path) => ConfigFile::load(path)?,
    None => {
      let path = config_dir().join("config.toml");
      if path.exists() { ConfigFile::load(&path)? } else { ConfigFile::default() }
    }
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let session_file = SessionFile::new(
    args
      .session_file
      .or(file_cfg.session_file)
      .unwrap_or_else(default_session_file),
  );

  let client = HttpClient::new(base_url)?;
  let ctx = commands::Context { client, session_file };

  match args.command {
    Command::Register { name, student_id, email, password, confirm } => {
      let confirm = confirm.unwrap_or_else(|| password.clone());
      commands::register(&ctx, name, student_id, email, password, confirm).await
    }
    Command::Login { email, password, provider, id_token } => match id_token {
      Some(id_token) => {
        let provider = provider.unwrap_or_else(|| "google".to_owned());
        commands::login_federated(&ctx, provider, id_token).await
      }
      None => {
        commands::login(&ctx, email.unwrap_or_default(), password.unwrap_or_default()).await
      }
    },
    Command::Logout => commands::logout(&ctx).await,
    Command::Whoami => commands::whoami(&ctx).await,
    Command::Submit { title, description, category, location, contact, priority } => {
      let draft = campus_core::complaint::ComplaintDraft {
        title,
        description,
        category,
        location,
        contact,
        priority,
      };
      commands::submit(&ctx, draft).await
    }
    Command::Mine => commands::mine(&ctx).await,
    Command::Dashboard { watch } => commands::dashboard(&ctx, watch).await,
    Command::Admin { watch } => commands::admin(&ctx, watch).await,
    Command::SetStatus { id, status, feedback } => {
      commands::set_status(&ctx, id, status, feedback).await
    }
  }
}
