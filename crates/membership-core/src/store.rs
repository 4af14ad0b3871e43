//! The `RecordStore` trait.
//!
//! The trait is implemented by storage adapters (`membership-store-json`,
//! `membership-store-sqlite`). The API layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  applicant::{Applicant, ApplicantId, StatusUpdate},
  query::ApplicantQuery,
};

/// Result of [`RecordStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
  Inserted,
  /// Another record already holds this email; nothing was written.
  EmailTaken,
}

/// Abstraction over an applicant store backend.
///
/// Adapters are the authoritative guard for uniqueness: a second record with
/// an existing email is reported as [`Insertion::EmailTaken`], and a record
/// whose identifier already exists is an error, never an overwrite.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert `applicant` unless its email is already registered.
  fn insert(
    &self,
    applicant: Applicant,
  ) -> impl Future<Output = Result<Insertion, Self::Error>> + Send + '_;

  /// Retrieve a record by identifier. Returns `None` if not found.
  fn find_by_id<'a>(
    &'a self,
    id: &'a ApplicantId,
  ) -> impl Future<Output = Result<Option<Applicant>, Self::Error>> + Send + 'a;

  /// Retrieve a record by its already-normalised (lower-case) email.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Applicant>, Self::Error>> + Send + 'a;

  /// All records matching `query`, in submission order.
  fn find_all<'a>(
    &'a self,
    query: &'a ApplicantQuery,
  ) -> impl Future<Output = Result<Vec<Applicant>, Self::Error>> + Send + 'a;

  /// Apply a review decision. Returns the updated record, or `None` if no
  /// record has this identifier.
  fn update_status<'a>(
    &'a self,
    id: &'a ApplicantId,
    update: StatusUpdate,
  ) -> impl Future<Output = Result<Option<Applicant>, Self::Error>> + Send + 'a;
}
