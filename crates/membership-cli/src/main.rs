//! `membership`: command-line admin client for the membership API.
//!
//! # Usage
//!
//! ```text
//! membership --url http://localhost:8080/api/membership --password secret list --status pending
//! membership --config ~/.config/membership/config.toml review MEM_1735000000000_1a2b3c4d accepted
//! ```

mod client;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, ListFilter};
use membership_core::applicant::Status;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080/api/membership";

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "membership", about = "Admin client for the membership intake API")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// API base URL including the mount path (default: http://localhost:8080/api/membership).
  #[arg(long, env = "MEMBERSHIP_URL", global = true)]
  url: Option<String>,

  /// Admin username; omitted from the login request when unset.
  #[arg(long, env = "MEMBERSHIP_USER", global = true)]
  user: Option<String>,

  /// Admin password (plaintext).
  #[arg(long, env = "MEMBERSHIP_PASSWORD", hide_env_values = true, global = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List applicants, newest last.
  List {
    #[arg(long)]
    status: Option<Status>,
    #[arg(long)]
    field:  Option<String>,
    /// Case-insensitive match on name or email.
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    page:   Option<usize>,
    #[arg(long)]
    limit:  Option<usize>,
  },
  /// Show every detail of one applicant.
  Show { id: String },
  /// Set the review status of an application.
  Review {
    id:      String,
    status:  Status,
    #[arg(long)]
    comment: Option<String>,
  },
  /// Aggregate counts.
  Stats,
  /// Download all applicants as CSV.
  Export {
    /// Write to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

/// CLI flags override the config file, which overrides defaults.
fn resolve(args: &Args, file: ConfigFile) -> ApiConfig {
  fn pick(flag: &Option<String>, file: String) -> Option<String> {
    flag.clone().or_else(|| (!file.is_empty()).then_some(file))
  }
  ApiConfig {
    base_url: pick(&args.url, file.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
    username: pick(&args.user, file.username).unwrap_or_default(),
    password: pick(&args.password, file.password).unwrap_or_default(),
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => read_config_file(path)?,
    None => ConfigFile::default(),
  };
  let api_config = resolve(&args, file_cfg);
  anyhow::ensure!(
    !api_config.password.is_empty(),
    "no admin password given (use --password, MEMBERSHIP_PASSWORD or the config file)"
  );

  let client = ApiClient::connect(&api_config).await?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::List { status, field, search, page, limit } => {
      let filter = ListFilter { status, field, search, page, limit };
      let reply = client.list(&filter).await?;
      let applicants = reply.data.unwrap_or_default();
      print!("{}", output::applicant_table(&applicants));
      eprintln!(
        "page {} of {} ({} matching)",
        reply.page.unwrap_or(1),
        reply.pages.unwrap_or(0),
        reply.total.unwrap_or(applicants.len()),
      );
    }
    Command::Show { id } => {
      let applicant = client.show(&id).await?;
      print!("{}", output::applicant_detail(&applicant));
    }
    Command::Review { id, status, comment } => {
      let message = client.review(&id, status, comment.as_deref()).await?;
      println!("{id}: {message}");
    }
    Command::Stats => {
      let stats = client.stats().await?;
      print!("{}", output::stats_summary(&stats));
    }
    Command::Export { output } => {
      let csv = client.export_csv().await?;
      match output {
        Some(path) => {
          std::fs::write(&path, csv.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
          eprintln!("wrote {}", path.display());
        }
        None => println!("{csv}"),
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(argv: &[&str]) -> Args { Args::try_parse_from(argv).unwrap() }

  #[test]
  fn flags_override_config_file() {
    let args = parse(&["membership", "--url", "http://api.test/m", "stats"]);
    let file = ConfigFile {
      url:      "http://file.test".into(),
      username: "clerk".into(),
      password: "from-file".into(),
    };
    let cfg = resolve(&args, file);
    assert_eq!(cfg.base_url, "http://api.test/m");
    assert_eq!(cfg.username, "clerk");
    assert_eq!(cfg.password, "from-file");
  }

  #[test]
  fn defaults_apply_when_nothing_is_set() {
    let args = Args {
      config:   None,
      url:      None,
      user:     None,
      password: None,
      command:  Command::Stats,
    };
    let cfg = resolve(&args, ConfigFile::default());
    assert_eq!(cfg.base_url, DEFAULT_URL);
    assert!(cfg.username.is_empty());
  }

  #[test]
  fn review_parses_status() {
    let args = parse(&["membership", "review", "MEM_1_x", "accepted", "--comment", "ok"]);
    match args.command {
      Command::Review { id, status, comment } => {
        assert_eq!(id, "MEM_1_x");
        assert_eq!(status, Status::Accepted);
        assert_eq!(comment.as_deref(), Some("ok"));
      }
      other => panic!("unexpected command {other:?}"),
    }
    assert!(Args::try_parse_from(["membership", "review", "MEM_1_x", "maybe"]).is_err());
  }

  #[test]
  fn config_file_fields_are_optional() {
    let file: ConfigFile = toml::from_str(r#"url = "http://x""#).unwrap();
    assert_eq!(file.url, "http://x");
    assert!(file.password.is_empty());
  }
}
