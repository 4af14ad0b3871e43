//! Server configuration: an optional TOML file overlaid with `MEMBERSHIP_*`
//! environment variables.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use membership_api::{DEFAULT_MOUNT_PATH, Sessions};
use serde::Deserialize;

/// Which [`membership_core::store::RecordStore`] adapter to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  /// Records vanish with the process.
  #[default]
  Memory,
  Json,
  Sqlite,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub mount_path:          String,
  pub store_backend:       StoreBackend,
  /// Defaults to `members.json` or `members.db` depending on the backend.
  pub store_path:          Option<PathBuf>,
  pub admin_username:      String,
  /// PHC string produced by `--hash-password`.
  pub admin_password_hash: String,
  pub session_ttl_secs:    u32,
  pub session_capacity:    usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      mount_path:          DEFAULT_MOUNT_PATH.to_string(),
      store_backend:       StoreBackend::default(),
      store_path:          None,
      admin_username:      "admin".to_string(),
      admin_password_hash: String::new(),
      session_ttl_secs:    24 * 60 * 60,
      session_capacity:    Sessions::DEFAULT_CAPACITY,
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply `MEMBERSHIP_*` overrides
  /// (e.g. `MEMBERSHIP_STORE_BACKEND=sqlite`).
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("MEMBERSHIP").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn session_ttl(&self) -> TimeDelta {
    TimeDelta::seconds(i64::from(self.session_ttl_secs))
  }

  /// The configured store path with `~` expanded, or the backend's default.
  pub fn resolved_store_path(&self) -> PathBuf {
    match &self.store_path {
      Some(path) => expand_tilde(path),
      None if self.store_backend == StoreBackend::Sqlite => PathBuf::from("members.db"),
      None => PathBuf::from("members.json"),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
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
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.mount_path, "/api/membership");
    assert_eq!(cfg.admin_username, "admin");
    assert_eq!(cfg.session_capacity, 100);
    assert_eq!(cfg.session_ttl(), TimeDelta::hours(24));
    assert_eq!(cfg.store_backend, StoreBackend::Memory);
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
      &path,
      r#"
        port = 9000
        mount_path = "/"
        store_backend = "sqlite"
        store_path = "/var/lib/membership/members.db"
        admin_password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
        session_ttl_secs = 600
      "#,
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.mount_path, "/");
    assert_eq!(cfg.store_backend, StoreBackend::Sqlite);
    assert_eq!(
      cfg.resolved_store_path(),
      PathBuf::from("/var/lib/membership/members.db")
    );
    assert!(cfg.admin_password_hash.starts_with("$argon2id$"));
    assert_eq!(cfg.session_ttl(), TimeDelta::minutes(10));
  }

  #[test]
  fn default_store_path_follows_backend() {
    let mut cfg = ServerConfig::default();
    cfg.store_backend = StoreBackend::Json;
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("members.json"));
    cfg.store_backend = StoreBackend::Sqlite;
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("members.db"));
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/members.json")),
      PathBuf::from(home).join("data/members.json")
    );
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
