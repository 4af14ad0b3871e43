//! Admin authentication: credential check, bearer sessions, and the
//! middleware guarding admin routes.

use std::{
  collections::VecDeque,
  sync::{Mutex, PoisonError},
};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use chrono::{DateTime, TimeDelta, Utc};
use membership_core::store::RecordStore;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{AppState, envelope::Envelope, error::ApiError, extract::JsonBody};

// ─── Credentials ─────────────────────────────────────────────────────────────

/// The single administrator this instance accepts.
#[derive(Clone)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AdminCredentials {
  /// `username` is optional on the wire; when given it must match.
  pub fn verify(&self, username: Option<&str>, password: &str) -> bool {
    if username.is_some_and(|u| u != self.username) {
      return false;
    }
    let parsed = match PasswordHash::new(&self.password_hash) {
      Ok(parsed) => parsed,
      Err(e) => {
        tracing::error!(error = %e, "configured admin password hash is not a PHC string");
        return false;
      }
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

struct Session {
  digest:     [u8; 32],
  expires_at: DateTime<Utc>,
}

/// A freshly issued bearer token. The clear-text token is only ever held
/// here, on its way to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// Process-lifetime set of valid admin tokens, oldest first.
///
/// Holds at most `capacity` sessions; issuing past that evicts the oldest.
/// Tokens are stored as SHA-256 digests.
pub struct Sessions {
  ttl:      TimeDelta,
  capacity: usize,
  issued:   Mutex<VecDeque<Session>>,
}

impl Sessions {
  pub const DEFAULT_CAPACITY: usize = 100;

  pub fn new(ttl: TimeDelta, capacity: usize) -> Self {
    Self {
      ttl,
      capacity: capacity.max(1),
      issued: Mutex::new(VecDeque::new()),
    }
  }

  pub fn issue(&self) -> IssuedToken { self.issue_at(Utc::now()) }

  pub fn is_valid(&self, token: &str) -> bool { self.is_valid_at(token, Utc::now()) }

  fn issue_at(&self, now: DateTime<Utc>) -> IssuedToken {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    let token = hex::encode(raw);
    let expires_at = now + self.ttl;

    let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
    issued.retain(|s| s.expires_at > now);
    while issued.len() >= self.capacity {
      issued.pop_front();
    }
    issued.push_back(Session { digest: digest(&token), expires_at });

    IssuedToken { token, expires_at }
  }

  fn is_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
    let digest = digest(token);
    let issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
    issued
      .iter()
      .filter(|s| s.expires_at > now)
      .fold(subtle::Choice::from(0), |found, s| found | s.digest[..].ct_eq(&digest[..]))
      .into()
  }
}

impl Default for Sessions {
  fn default() -> Self { Self::new(TimeDelta::hours(24), Self::DEFAULT_CAPACITY) }
}

fn digest(token: &str) -> [u8; 32] { Sha256::digest(token.as_bytes()).into() }

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Route layer for admin-only routes.
pub async fn require_admin<S>(
  State(state): State<AppState<S>>,
  request: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: RecordStore + 'static,
{
  match bearer_token(request.headers()) {
    None => {
      return Err(ApiError::Unauthorized("authentication required".into()));
    }
    Some(token) if !state.sessions.is_valid(token) => {
      return Err(ApiError::Unauthorized("invalid or expired token".into()));
    }
    Some(_) => {}
  }
  Ok(next.run(request).await)
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  #[serde(default)]
  pub password: String,
}

/// `POST /login`: body: `{"username"?: "...", "password": "..."}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<Envelope<IssuedToken>>, ApiError>
where
  S: RecordStore + 'static,
{
  if !state.admin.verify(body.username.as_deref(), &body.password) {
    tracing::warn!(username = ?body.username, "rejected admin login");
    return Err(ApiError::Unauthorized("invalid credentials".into()));
  }

  let issued = state.sessions.issue();
  tracing::info!(expires_at = %issued.expires_at, "admin session issued");
  Ok(Json(Envelope::data(issued).with_message("login successful")))
}
