//! Error type for `membership-store-json`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A generated identifier collided with an existing record.
  #[error("applicant id already exists: {0}")]
  DuplicateId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
