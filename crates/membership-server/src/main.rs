//! membership-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured record store, and serves the membership API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```text
//! cargo run -p membership-server -- --hash-password
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use argon2::{Argon2, PasswordHash, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use membership_api::{AdminCredentials, AppState, Sessions};
use membership_core::store::RecordStore;
use membership_store_json::JsonStore;
use membership_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, StoreBackend};

#[derive(Parser)]
#[command(author, version, about = "Membership intake API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  anyhow::ensure!(
    !cfg.admin_password_hash.is_empty(),
    "admin_password_hash is not set; generate one with --hash-password"
  );
  PasswordHash::new(&cfg.admin_password_hash)
    .map_err(|e| anyhow::anyhow!("admin_password_hash is not an argon2 PHC string: {e}"))?;

  match cfg.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("using the in-memory store; records are lost on exit");
      serve(JsonStore::in_memory(), &cfg).await
    }
    StoreBackend::Json => {
      let path = cfg.resolved_store_path();
      let store = JsonStore::open(&path)
        .await
        .with_context(|| format!("failed to open JSON store at {path:?}"))?;
      serve(store, &cfg).await
    }
    StoreBackend::Sqlite => {
      let path = cfg.resolved_store_path();
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open SQLite store at {path:?}"))?;
      serve(store, &cfg).await
    }
  }
}

async fn serve<S>(store: S, cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: RecordStore + 'static,
{
  let state = AppState::new(
    store,
    AdminCredentials {
      username:      cfg.admin_username.clone(),
      password_hash: cfg.admin_password_hash.clone(),
    },
    Sessions::new(cfg.session_ttl(), cfg.session_capacity),
  );

  let app = membership_api::router(state, &cfg.mount_path).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!(backend = ?cfg.store_backend, mount = %cfg.mount_path, "listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut stream) => {
        stream.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutdown requested");
}

/// Read one line from stdin as the password.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\r', '\n']).to_string();
  anyhow::ensure!(!password.is_empty(), "empty password");
  Ok(password)
}
