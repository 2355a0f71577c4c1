//! Client configuration file and the persisted session.

use std::{
  io::Write as _,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use campus_core::user::Session;
use serde::Deserialize;

/// Shape of the optional TOML config file.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct ConfigFile {
  #[serde(default)]
  pub url:          String,
  #[serde(default)]
  pub session_file: Option<PathBuf>,
}

impl ConfigFile {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// `$XDG_CONFIG_HOME/campus` or `~/.config/campus`.
pub fn config_dir() -> PathBuf {
  std::env::var_os("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
    .unwrap_or_else(|| PathBuf::from("."))
    .join("campus")
}

pub fn default_session_file() -> PathBuf { config_dir().join("session.json") }

/// Where the signed-in [`Session`] is kept between invocations.
#[derive(Debug, Clone)]
pub struct SessionFile {
  path: PathBuf,
}

impl SessionFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// The stored session, or `None` when signed out.
  pub fn load(&self) -> anyhow::Result<Option<Session>> {
    let raw = match std::fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(e).with_context(|| format!("reading {}", self.path.display()));
      }
    };
    let session = serde_json::from_str(&raw)
      .with_context(|| format!("parsing session file {}", self.path.display()))?;
    Ok(Some(session))
  }

  pub fn save(&self, session: &Session) -> anyhow::Result<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(session)?;

    // The file holds a bearer token: owner read/write only.
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt as _;
      options.mode(0o600);
    }
    let mut file = options
      .open(&self.path)
      .with_context(|| format!("writing {}", self.path.display()))?;
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt as _;
      file
        .set_permissions(std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restricting {}", self.path.display()))?;
    }
    file
      .write_all(json.as_bytes())
      .with_context(|| format!("writing {}", self.path.display()))
  }

  pub fn clear(&self) -> anyhow::Result<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
    }
  }
}
