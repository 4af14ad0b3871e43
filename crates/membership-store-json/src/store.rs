//! [`JsonStore`]: the in-process / JSON-file implementation of
//! [`RecordStore`].

use std::{
  ffi::OsString,
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use membership_core::{
  applicant::{Applicant, ApplicantId, StatusUpdate},
  query::ApplicantQuery,
  store::{Insertion, RecordStore},
};
use tokio::{io::AsyncWriteExt, sync::RwLock};

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record array, optionally mirrored to a JSON file.
///
/// Cloning is cheap: clones share the same records.
#[derive(Clone, Default)]
pub struct JsonStore {
  records: Arc<RwLock<Vec<Applicant>>>,
  path:    Option<Arc<Path>>,
}

impl JsonStore {
  /// A store that lives only as long as the process: useful for testing.
  pub fn in_memory() -> Self { Self::default() }

  /// Open (or create) a store backed by the JSON array at `path`.
  ///
  /// A missing or empty file starts an empty store; the file itself is only
  /// written on the first mutation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }

    let records: Vec<Applicant> = match tokio::fs::read(path).await {
      Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
      Ok(bytes) => serde_json::from_slice(&bytes)?,
      Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
      Err(e) => return Err(e.into()),
    };
    tracing::debug!(path = %path.display(), count = records.len(), "loaded applicant records");

    Ok(Self {
      records: Arc::new(RwLock::new(records)),
      path:    Some(Arc::from(path)),
    })
  }

  /// Write the full array to a sibling temp file, sync it, then rename it
  /// over the store file. Callers hold the write lock.
  async fn persist(&self, records: &[Applicant]) -> Result<()> {
    let Some(path) = &self.path else {
      return Ok(());
    };
    let json = serde_json::to_vec_pretty(records)?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for JsonStore {
  type Error = Error;

  async fn insert(&self, applicant: Applicant) -> Result<Insertion> {
    let mut records = self.records.write().await;

    if records.iter().any(|r| r.id == applicant.id) {
      return Err(Error::DuplicateId(applicant.id.to_string()));
    }
    if records.iter().any(|r| r.email == applicant.email) {
      return Ok(Insertion::EmailTaken);
    }

    records.push(applicant);
    if let Err(e) = self.persist(&records).await {
      records.pop();
      return Err(e);
    }
    Ok(Insertion::Inserted)
  }

  async fn find_by_id(&self, id: &ApplicantId) -> Result<Option<Applicant>> {
    let records = self.records.read().await;
    Ok(records.iter().find(|r| &r.id == id).cloned())
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<Applicant>> {
    let records = self.records.read().await;
    Ok(records.iter().find(|r| r.email == email).cloned())
  }

  async fn find_all(&self, query: &ApplicantQuery) -> Result<Vec<Applicant>> {
    let records = self.records.read().await;
    Ok(records.iter().filter(|r| query.matches(r)).cloned().collect())
  }

  async fn update_status(
    &self,
    id: &ApplicantId,
    update: StatusUpdate,
  ) -> Result<Option<Applicant>> {
    let mut records = self.records.write().await;

    let Some(index) = records.iter().position(|r| &r.id == id) else {
      return Ok(None);
    };
    let previous = records[index].clone();
    records[index].apply(&update);

    if let Err(e) = self.persist(&records).await {
      records[index] = previous;
      return Err(e);
    }
    Ok(Some(records[index].clone()))
  }
}
