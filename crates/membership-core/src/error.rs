//! Error types for `membership-core`.

use thiserror::Error;

/// A submission or status value that fails domain validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("invalid status {0:?}: expected pending, accepted or rejected")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
