//! Aggregate views over the whole store: `/stats` and `/export`.

use axum::{
  Json,
  extract::State,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use membership_core::{
  query::ApplicantQuery,
  report::{Stats, render_csv},
  store::RecordStore,
};
use serde::Deserialize;

use crate::{AppState, envelope::Envelope, error::ApiError, extract::QueryParams};

/// `GET /stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Envelope<Stats>>, ApiError>
where
  S: RecordStore + 'static,
{
  let all = state
    .store
    .find_all(&ApplicantQuery::default())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Envelope::data(Stats::collect(&all))))
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub format: Option<String>,
}

/// `GET /export[?format=csv]`
pub async fn export<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<ExportParams>,
) -> Result<Response, ApiError>
where
  S: RecordStore + 'static,
{
  let format = params.format.as_deref().map(str::trim).unwrap_or("csv");
  if !format.eq_ignore_ascii_case("csv") {
    return Err(ApiError::Validation(format!("unsupported export format: {format}")));
  }

  let all = state
    .store
    .find_all(&ApplicantQuery::default())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::info!(count = all.len(), "exporting applicants as csv");

  Ok(
    (
      [
        (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
        (
          header::CONTENT_DISPOSITION,
          HeaderValue::from_static("attachment; filename=members_export.csv"),
        ),
      ],
      render_csv(&all),
    )
      .into_response(),
  )
}
