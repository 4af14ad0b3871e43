//! Tests for `JsonStore`, both in memory and backed by a temp file.

use chrono::Utc;
use membership_core::{
  applicant::{Applicant, ApplicantId, Status, StatusUpdate, Submission},
  query::ApplicantQuery,
  store::{Insertion, RecordStore},
};

use crate::{Error, JsonStore};

fn applicant(first: &str, email: &str) -> Applicant {
  let now = Utc::now();
  Submission {
    first_name: Some(first.into()),
    last_name: Some("Noether".into()),
    email: Some(email.into()),
    phone: Some("000".into()),
    title: Some("Professor".into()),
    field: Some("algebra".into()),
    motivation: Some("Rings".into()),
    ..Submission::default()
  }
  .validate()
  .unwrap()
  .into_applicant(ApplicantId::generate(now), now)
}

// ─── In memory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find() {
  let s = JsonStore::in_memory();
  let a = applicant("Emmy", "emmy@example.org");

  assert_eq!(s.insert(a.clone()).await.unwrap(), Insertion::Inserted);

  let by_id = s.find_by_id(&a.id).await.unwrap().unwrap();
  assert_eq!(by_id, a);
  let by_email = s.find_by_email("emmy@example.org").await.unwrap().unwrap();
  assert_eq!(by_email.id, a.id);
}

#[tokio::test]
async fn missing_id_returns_none() {
  let s = JsonStore::in_memory();
  let found = s.find_by_id(&ApplicantId::from("MEM_0_deadbeef")).await.unwrap();
  assert!(found.is_none());
}

#[tokio::test]
async fn second_insert_with_same_email_is_refused() {
  let s = JsonStore::in_memory();
  s.insert(applicant("Emmy", "emmy@example.org")).await.unwrap();

  let outcome = s.insert(applicant("Other", "emmy@example.org")).await.unwrap();
  assert_eq!(outcome, Insertion::EmailTaken);
  assert_eq!(s.find_all(&ApplicantQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_id_is_an_error() {
  let s = JsonStore::in_memory();
  let a = applicant("Emmy", "emmy@example.org");
  let mut b = applicant("Other", "other@example.org");
  b.id = a.id.clone();

  s.insert(a).await.unwrap();
  assert!(matches!(s.insert(b).await, Err(Error::DuplicateId(_))));
}

#[tokio::test]
async fn find_all_preserves_submission_order_and_filters() {
  let s = JsonStore::in_memory();
  for (name, email) in [("Jean", "j@a.fr"), ("Marie", "m@a.fr"), ("Jeanne", "jj@a.fr")] {
    s.insert(applicant(name, email)).await.unwrap();
  }

  let all = s.find_all(&ApplicantQuery::default()).await.unwrap();
  let names: Vec<_> = all.iter().map(|a| a.first_name.as_str()).collect();
  assert_eq!(names, ["Jean", "Marie", "Jeanne"]);

  let query = ApplicantQuery {
    search: Some("jean".into()),
    ..ApplicantQuery::default()
  };
  assert_eq!(s.find_all(&query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_status_changes_only_review_fields() {
  let s = JsonStore::in_memory();
  let a = applicant("Emmy", "emmy@example.org");
  s.insert(a.clone()).await.unwrap();

  let at = Utc::now();
  let updated = s
    .update_status(&a.id, StatusUpdate::new(Status::Accepted, Some("welcome".into()), at))
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.status, Status::Accepted);
  assert_eq!(updated.updated_at, Some(at));
  assert_eq!(updated.admin_comment.as_deref(), Some("welcome"));
  assert_eq!(updated.email, a.email);
  assert_eq!(updated.submitted_at, a.submitted_at);

  let query = ApplicantQuery {
    status: Some(Status::Accepted),
    ..ApplicantQuery::default()
  };
  assert_eq!(s.find_all(&query).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_unknown_id_returns_none() {
  let s = JsonStore::in_memory();
  let result = s
    .update_status(
      &ApplicantId::from("nope"),
      StatusUpdate::new(Status::Rejected, None, Utc::now()),
    )
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── File-backed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn records_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("members.json");

  let a = applicant("Emmy", "emmy@example.org");
  {
    let s = JsonStore::open(&path).await.unwrap();
    s.insert(a.clone()).await.unwrap();
    s.update_status(&a.id, StatusUpdate::new(Status::Rejected, None, Utc::now()))
      .await
      .unwrap();
  }

  let reopened = JsonStore::open(&path).await.unwrap();
  let found = reopened.find_by_id(&a.id).await.unwrap().unwrap();
  assert_eq!(found.status, Status::Rejected);
  assert!(!path.with_file_name("members.json.tmp").exists());
}

#[tokio::test]
async fn each_write_leaves_a_complete_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("members.json");
  let s = JsonStore::open(&path).await.unwrap();

  for (i, name) in ["Ada", "Grace", "Hedy"].into_iter().enumerate() {
    s.insert(applicant(name, &format!("{name}@example.org")))
      .await
      .unwrap();
    let on_disk: Vec<Applicant> =
      serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), i + 1);
    assert_eq!(on_disk[i].first_name, name);
    assert!(!path.with_file_name("members.json.tmp").exists());
  }
}

#[tokio::test]
async fn empty_file_opens_as_empty_store() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("members.json");
  std::fs::write(&path, "\n").unwrap();

  let s = JsonStore::open(&path).await.unwrap();
  assert!(s.find_all(&ApplicantQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_file_is_reported() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("members.json");
  std::fs::write(&path, "{ not json").unwrap();

  assert!(matches!(JsonStore::open(&path).await, Err(Error::Json(_))));
}
