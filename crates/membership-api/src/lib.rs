//! JSON HTTP API for the membership intake service.
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`]. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = membership_api::router(state, "/api/membership");
//! axum::serve(listener, app).await?;
//! ```

pub mod applicants;
pub mod auth;
pub mod cors;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod reports;

use std::sync::Arc;

use axum::{
  Json, Router, middleware,
  routing::{MethodRouter, get, post, put},
};
use chrono::{DateTime, Utc};
use membership_core::store::RecordStore;
use serde::Serialize;

pub use auth::{AdminCredentials, Sessions};
pub use envelope::Envelope;
pub use error::ApiError;

/// Mount point used when none is configured.
pub const DEFAULT_MOUNT_PATH: &str = "/api/membership";

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub admin:    Arc<AdminCredentials>,
  pub sessions: Arc<Sessions>,
}

impl<S> AppState<S> {
  pub fn new(store: S, admin: AdminCredentials, sessions: Sessions) -> Self {
    Self {
      store:    Arc::new(store),
      admin:    Arc::new(admin),
      sessions: Arc::new(sessions),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      admin:    Arc::clone(&self.admin),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

// ─── Routes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Public,
  /// Requires a bearer token from `/login`.
  Admin,
}

type Route<S> = (&'static str, Access, MethodRouter<AppState<S>>);

fn routes<S>() -> Vec<Route<S>>
where
  S: RecordStore + 'static,
{
  vec![
    ("/submit",       Access::Public, post(applicants::submit::<S>)),
    ("/verify",       Access::Public, post(applicants::verify::<S>)),
    ("/login",        Access::Public, post(auth::login::<S>)),
    ("/test",         Access::Public, get(liveness)),
    ("/members",      Access::Admin,  get(applicants::list::<S>)),
    ("/member/{id}",  Access::Admin,  get(applicants::get_one::<S>)),
    ("/update/{id}",  Access::Admin,  put(applicants::update_status::<S>)),
    ("/stats",        Access::Admin,  get(reports::stats::<S>)),
    ("/export",       Access::Admin,  get(reports::export::<S>)),
  ]
}

/// The API routes relative to their mount point, with state applied.
///
/// Every path also matches with a trailing slash.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  let mut router = Router::new();
  for (path, access, method_router) in routes::<S>() {
    let method_router = match access {
      Access::Public => method_router,
      Access::Admin => method_router.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_admin::<S>,
      )),
    };
    router = router
      .route(path, method_router.clone())
      .route(&format!("{path}/"), method_router);
  }

  router
    .method_not_allowed_fallback(method_not_allowed)
    .fallback(not_found)
    .with_state(state)
}

/// The full application: API routes under `mount_path` (`""` or `/` for the
/// root), unmatched paths answered with 404, CORS on everything.
pub fn router<S>(state: AppState<S>, mount_path: &str) -> Router<()>
where
  S: RecordStore + 'static,
{
  let api = api_router(state);
  let mount = mount_path.trim_matches('/');
  let app = if mount.is_empty() {
    api
  } else {
    Router::new().nest(&format!("/{mount}"), api)
  };

  app
    .fallback(not_found)
    .layer(middleware::from_fn(cors::cors))
}

async fn not_found() -> ApiError { ApiError::NotFound("no such endpoint".into()) }

async fn method_not_allowed() -> ApiError { ApiError::MethodNotAllowed }

#[derive(Debug, Serialize)]
struct Liveness {
  timestamp: DateTime<Utc>,
}

/// `GET /test`
async fn liveness() -> Json<Envelope<Liveness>> {
  Json(Envelope::data(Liveness { timestamp: Utc::now() }).with_message("membership api is up"))
}
