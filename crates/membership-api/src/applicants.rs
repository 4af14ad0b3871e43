//! Handlers for applicant records.
//!
//! | Method | Path | Access | Notes |
//! |--------|------|--------|-------|
//! | `POST` | `/submit` | public | Body: the application form |
//! | `POST` | `/verify` | public | Body: `{"email": "..."}` |
//! | `GET`  | `/members` | admin | `?status&field&search&page&limit` |
//! | `GET`  | `/member/{id}` | admin | 404 if not found |
//! | `PUT`  | `/update/{id}` | admin | Body: `{"status": "...", "comment"?: "..."}` |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use chrono::Utc;
use membership_core::{
  applicant::{
    Applicant, ApplicantId, Status, StatusUpdate, Submission, normalize_email,
  },
  query::{ApplicantQuery, Pagination},
  store::{Insertion, RecordStore},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── Submit ──────────────────────────────────────────────────────────────────

/// What the applicant gets back after a successful submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
  pub id:         ApplicantId,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub status:     Status,
}

impl From<&Applicant> for Receipt {
  fn from(a: &Applicant) -> Self {
    Self {
      id:         a.id.clone(),
      first_name: a.first_name.clone(),
      last_name:  a.last_name.clone(),
      email:      a.email.clone(),
      status:     a.status,
    }
  }
}

fn duplicate(email: &str) -> ApiError {
  ApiError::Duplicate(format!("an application for {email} already exists"))
}

/// `POST /submit`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  JsonBody(submission): JsonBody<Submission>,
) -> Result<Json<Envelope<Receipt>>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut new = submission.validate()?;
  new.client_ip = client_ip(&headers);
  new.user_agent = header_text(&headers, header::USER_AGENT.as_str());

  let existing = state
    .store
    .find_by_email(&new.email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if existing.is_some() {
    return Err(duplicate(&new.email));
  }

  let now = Utc::now();
  let applicant = new.into_applicant(ApplicantId::generate(now), now);
  let receipt = Receipt::from(&applicant);

  let outcome = state
    .store
    .insert(applicant)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if outcome == Insertion::EmailTaken {
    return Err(duplicate(&receipt.email));
  }

  tracing::info!(id = %receipt.id, "membership application recorded");
  Ok(Json(
    Envelope::data(receipt).with_message("application submitted"),
  ))
}

/// The caller's address as reported by the fronting proxy.
fn client_ip(headers: &HeaderMap) -> Option<String> {
  header_text(headers, "client-ip").or_else(|| {
    header_text(headers, "x-forwarded-for")
      .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_owned()))
      .filter(|ip| !ip.is_empty())
  })
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_owned)
}

// ─── Verify ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Registration {
  pub exists: bool,
}

/// `POST /verify`: is this email already registered?
pub async fn verify<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<VerifyBody>,
) -> Result<Json<Envelope<Registration>>, ApiError>
where
  S: RecordStore + 'static,
{
  let email = body
    .email
    .as_deref()
    .map(normalize_email)
    .filter(|e| !e.is_empty())
    .ok_or(membership_core::Error::MissingField("email"))?;

  let exists = state
    .store
    .find_by_email(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_some();

  let message = if exists { "email already registered" } else { "email available" };
  Ok(Json(Envelope::data(Registration { exists }).with_message(message)))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
  pub field:  Option<String>,
  /// Alias for `field`.
  pub domain: Option<String>,
  pub search: Option<String>,
  pub page:   Option<String>,
  pub limit:  Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// `GET /members[?status&field&search&page&limit]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Envelope<Vec<Applicant>>>, ApiError>
where
  S: RecordStore + 'static,
{
  let pagination = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
  let query = ApplicantQuery {
    status: non_blank(params.status)
      .map(|s| s.parse::<Status>())
      .transpose()?,
    field:  non_blank(params.field).or_else(|| non_blank(params.domain)),
    search: non_blank(params.search),
  };

  let matches = state
    .store
    .find_all(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Envelope::paginated(pagination.apply(matches))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /member/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<String>,
) -> Result<Json<Envelope<Applicant>>, ApiError>
where
  S: RecordStore + 'static,
{
  let id = ApplicantId::from(id);
  let applicant = state
    .store
    .find_by_id(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("applicant {id} not found")))?;
  Ok(Json(Envelope::data(applicant)))
}

// ─── Update status ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub status:  Option<String>,
  pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
  pub id:     ApplicantId,
  pub status: Status,
}

/// `PUT /update/{id}`: body: `{"status": "accepted", "comment"?: "..."}`
pub async fn update_status<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<String>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Envelope<StatusChange>>, ApiError>
where
  S: RecordStore + 'static,
{
  // Checked before the lookup: a bad status is a 400 for any id.
  let status: Status = body.status.as_deref().unwrap_or_default().trim().parse()?;

  let id = ApplicantId::from(id);
  let update = StatusUpdate::new(status, body.comment, Utc::now());
  let updated = state
    .store
    .update_status(&id, update)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("applicant {id} not found")))?;

  tracing::info!(%id, %status, "applicant status updated");
  Ok(Json(
    Envelope::data(StatusChange { id: updated.id, status: updated.status })
      .with_message(format!("status changed to {status}")),
  ))
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn client_ip_prefers_explicit_header() {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
    assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.1"));

    headers.insert("client-ip", HeaderValue::from_static("192.0.2.7"));
    assert_eq!(client_ip(&headers).as_deref(), Some("192.0.2.7"));
  }

  #[test]
  fn client_ip_absent_without_headers() {
    assert_eq!(client_ip(&HeaderMap::new()), None);
  }
}
