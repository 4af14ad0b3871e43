//! Plain-text rendering of API results for the terminal.

use std::fmt::Write as _;

use membership_core::{applicant::Applicant, report::Stats};

/// One line per applicant: id, status, name, email, field.
pub fn applicant_table(applicants: &[Applicant]) -> String {
  let mut out = String::new();
  for a in applicants {
    let name = format!("{} {}", a.first_name, a.last_name);
    let _ = writeln!(
      out,
      "{:<26} {:<9} {:<28} {:<32} {}",
      a.id, a.status, name, a.email, a.field
    );
  }
  out
}

/// Every stored detail of one applicant, one `label: value` per line.
/// Blank optional fields are skipped.
pub fn applicant_detail(a: &Applicant) -> String {
  let submitted = a.submitted_at.format("%Y-%m-%d %H:%M UTC").to_string();
  let updated = a
    .updated_at
    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
    .unwrap_or_default();
  let newsletter = if a.newsletter { "yes" } else { "no" };

  let rows: [(&str, &str); 22] = [
    ("id", a.id.as_str()),
    ("status", a.status.as_str()),
    ("first name", &a.first_name),
    ("last name", &a.last_name),
    ("email", &a.email),
    ("phone", &a.phone),
    ("date of birth", &a.date_of_birth),
    ("nationality", &a.nationality),
    ("address", &a.address),
    ("city", &a.city),
    ("country", &a.country),
    ("title", &a.title),
    ("institution", &a.institution),
    ("field", &a.field),
    ("presentation", &a.presentation),
    ("motivation", &a.motivation),
    ("interests", &a.interests),
    ("links", &a.links),
    ("newsletter", newsletter),
    ("submitted", &submitted),
    ("reviewed", &updated),
    ("comment", a.admin_comment.as_deref().unwrap_or_default()),
  ];

  let mut out = String::new();
  for (label, value) in rows.iter().filter(|(_, v)| !v.is_empty()) {
    let _ = writeln!(out, "{label:>14}: {value}");
  }
  out
}

pub fn stats_summary(stats: &Stats) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "total {}  pending {}  accepted {}  rejected {}  newsletter {}",
    stats.total, stats.pending, stats.accepted, stats.rejected, stats.newsletter
  );
  out.push_str("\nby field:\n");
  for (field, count) in &stats.by_field {
    let _ = writeln!(out, "  {field:<30} {count}");
  }
  out.push_str("\nby month:\n");
  for (month, count) in &stats.by_month {
    let _ = writeln!(out, "  {month:<30} {count}");
  }
  out
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use chrono::{TimeZone, Utc};
  use membership_core::applicant::{ApplicantId, Submission};

  use super::*;

  fn sample() -> Applicant {
    let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
    Submission {
      first_name: Some("Jean".into()),
      last_name: Some("Leray".into()),
      email: Some("jl@example.org".into()),
      phone: Some("000".into()),
      title: Some("Professor".into()),
      field: Some("analysis".into()),
      motivation: Some("Sheaves".into()),
      ..Submission::default()
    }
    .validate()
    .unwrap()
    .into_applicant(ApplicantId::from("MEM_1_abcdef01"), at)
  }

  #[test]
  fn table_has_one_line_per_applicant() {
    let table = applicant_table(&[sample(), sample()]);
    assert_eq!(table.lines().count(), 2);
    assert!(table.starts_with("MEM_1_abcdef01"));
    assert!(table.contains("Jean LERAY"));
  }

  #[test]
  fn detail_skips_blank_fields() {
    let detail = applicant_detail(&sample());
    assert!(detail.contains("submitted: 2025-03-14 09:30 UTC"));
    assert!(detail.contains("newsletter: no"));
    assert!(!detail.contains("nationality"));
    assert!(!detail.contains("comment"));
  }

  #[test]
  fn stats_list_every_bucket() {
    let stats = Stats {
      total: 3,
      pending: 2,
      accepted: 1,
      by_field: BTreeMap::from([("analysis".to_string(), 3)]),
      by_month: BTreeMap::from([("2025-03".to_string(), 3)]),
      ..Stats::default()
    };
    let text = stats_summary(&stats);
    assert!(text.starts_with("total 3  pending 2  accepted 1  rejected 0"));
    assert!(text.contains("analysis"));
    assert!(text.contains("2025-03"));
  }
}
