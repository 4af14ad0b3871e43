//! Error type for `membership-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] membership_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A generated identifier collided with an existing row.
  #[error("applicant id already exists: {0}")]
  DuplicateId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
