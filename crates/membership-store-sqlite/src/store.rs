//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use membership_core::{
  applicant::{Applicant, ApplicantId, StatusUpdate},
  query::ApplicantQuery,
  store::{Insertion, RecordStore},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{COLUMNS, RawApplicant, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A membership record store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch at most one row matching `column = value`.
  async fn find_one(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Applicant>> {
    let raw: Option<RawApplicant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM applicants WHERE {column} = ?1"),
              rusqlite::params![value],
              RawApplicant::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApplicant::into_applicant).transpose()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, a: Applicant) -> Result<Insertion> {
    let id = a.id.to_string();
    let submitted_at = encode_dt(a.submitted_at);
    let updated_at = a.updated_at.map(encode_dt);
    let status = a.status.as_str();

    // `None` means the identifier is taken.
    let outcome: Option<Insertion> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let id_taken = tx
          .query_row(
            "SELECT 1 FROM applicants WHERE id = ?1",
            rusqlite::params![id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if id_taken {
          return Ok(None);
        }

        let changed = tx.execute(
          "INSERT INTO applicants (
             id, first_name, last_name, email, phone, date_of_birth,
             nationality, address, city, country, title, institution, field,
             presentation, motivation, interests, links, newsletter,
             submitted_at, status, updated_at, admin_comment, client_ip,
             user_agent
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![
            id,
            a.first_name,
            a.last_name,
            a.email,
            a.phone,
            a.date_of_birth,
            a.nationality,
            a.address,
            a.city,
            a.country,
            a.title,
            a.institution,
            a.field,
            a.presentation,
            a.motivation,
            a.interests,
            a.links,
            a.newsletter,
            submitted_at,
            status,
            updated_at,
            a.admin_comment,
            a.client_ip,
            a.user_agent,
          ],
        )?;
        tx.commit()?;

        Ok(Some(if changed == 0 {
          Insertion::EmailTaken
        } else {
          Insertion::Inserted
        }))
      })
      .await?;

    outcome.ok_or_else(|| Error::DuplicateId(a.id.to_string()))
  }

  async fn find_by_id(&self, id: &ApplicantId) -> Result<Option<Applicant>> {
    self.find_one("id", id.to_string()).await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<Applicant>> {
    self.find_one("email", email.to_owned()).await
  }

  async fn find_all(&self, query: &ApplicantQuery) -> Result<Vec<Applicant>> {
    let status = query.status.map(|s| s.as_str());
    let field = query.field.clone();

    let raws: Vec<RawApplicant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM applicants
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR field = ?2)
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status, field], RawApplicant::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut applicants: Vec<Applicant> = raws
      .into_iter()
      .map(RawApplicant::into_applicant)
      .collect::<Result<_>>()?;

    // SQLite's lower() only folds ASCII, so free-text search runs here.
    applicants.retain(|a| query.matches_search(a));
    Ok(applicants)
  }

  async fn update_status(
    &self,
    id: &ApplicantId,
    update: StatusUpdate,
  ) -> Result<Option<Applicant>> {
    let id_str = id.to_string();
    let status = update.status.as_str();
    let at_str = encode_dt(update.at);
    let comment = update.comment;

    let raw: Option<RawApplicant> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE applicants
           SET status = ?2,
               updated_at = ?3,
               admin_comment = COALESCE(?4, admin_comment)
           WHERE id = ?1",
          rusqlite::params![id_str, status, at_str, comment],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {COLUMNS} FROM applicants WHERE id = ?1"),
          rusqlite::params![id_str],
          RawApplicant::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    if raw.is_some() {
      tracing::debug!(%id, %status, "applicant status updated");
    }
    raw.map(RawApplicant::into_applicant).transpose()
  }
}
