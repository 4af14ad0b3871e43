//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::Envelope;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Duplicate(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("method not allowed")]
  MethodNotAllowed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<membership_core::Error> for ApiError {
  fn from(e: membership_core::Error) -> Self { Self::Validation(e.to_string()) }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_) | Self::Duplicate(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Store(e) => {
        tracing::error!(error = %e, "record store failure");
        "internal server error".to_owned()
      }
      other => other.to_string(),
    };

    let mut response = (status, Json(Envelope::<()>::error(message))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_are_validation_errors() {
    let e = ApiError::from(membership_core::Error::MissingField("phone"));
    assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    assert_eq!(e.to_string(), "phone is required");
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let resp = ApiError::Unauthorized("no token".into()).into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");
  }

  #[test]
  fn store_errors_hide_their_source() {
    let source = std::io::Error::other("disk on fire");
    let resp = ApiError::Store(Box::new(source)).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
