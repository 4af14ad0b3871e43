//! Aggregate statistics and the CSV export, both computed by a full scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::applicant::{Applicant, Status};

/// Field name used for applicants who left the field of interest blank.
pub const UNSPECIFIED_FIELD: &str = "unspecified";

/// Counts over the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total:      usize,
  pub pending:    usize,
  pub accepted:   usize,
  pub rejected:   usize,
  /// Applicants who opted in to the newsletter.
  pub newsletter: usize,
  pub by_field:   BTreeMap<String, usize>,
  /// Keyed by submission month, `YYYY-MM`.
  pub by_month:   BTreeMap<String, usize>,
}

impl Stats {
  pub fn collect<'a>(applicants: impl IntoIterator<Item = &'a Applicant>) -> Self {
    let mut stats = Self::default();
    for a in applicants {
      stats.total += 1;
      match a.status {
        Status::Pending => stats.pending += 1,
        Status::Accepted => stats.accepted += 1,
        Status::Rejected => stats.rejected += 1,
      }
      if a.newsletter {
        stats.newsletter += 1;
      }

      let field = if a.field.trim().is_empty() {
        UNSPECIFIED_FIELD.to_owned()
      } else {
        a.field.clone()
      };
      *stats.by_field.entry(field).or_default() += 1;

      let month = a.submitted_at.format("%Y-%m").to_string();
      *stats.by_month.entry(month).or_default() += 1;
    }
    stats
  }
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

pub const CSV_HEADER: &str = "ID,First name,Last name,Email,Phone,Title,Field,Status,Date";

/// Render a header row plus one fully-quoted row per applicant.
pub fn render_csv<'a>(applicants: impl IntoIterator<Item = &'a Applicant>) -> String {
  let mut out = String::from(CSV_HEADER);
  for a in applicants {
    let date = a.submitted_at.format("%Y-%m-%d").to_string();
    let row: [&str; 9] = [
      a.id.as_str(),
      &a.first_name,
      &a.last_name,
      &a.email,
      &a.phone,
      &a.title,
      &a.field,
      a.status.as_str(),
      &date,
    ];
    let row = row.map(quote).join(",");
    out.push('\n');
    out.push_str(&row);
  }
  out
}

fn quote(value: &str) -> String { format!("\"{}\"", value.replace('"', "\"\"")) }

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::applicant::{ApplicantId, Submission};

  fn applicant(id: &str, field: &str, month: u32, newsletter: bool) -> Applicant {
    let mut a = Submission {
      first_name: Some("Émilie".into()),
      last_name: Some("du Châtelet".into()),
      email: Some(format!("{id}@example.org")),
      phone: Some("01".into()),
      title: Some("Marquise".into()),
      field: Some("physics".into()),
      motivation: Some("Newton".into()),
      newsletter,
      ..Submission::default()
    }
    .validate()
    .unwrap()
    .into_applicant(
      ApplicantId::from(id),
      Utc.with_ymd_and_hms(2025, month, 2, 12, 0, 0).unwrap(),
    );
    a.field = field.to_owned();
    a
  }

  #[test]
  fn stats_group_by_status_field_and_month() {
    let mut records = vec![
      applicant("a", "algebra", 1, true),
      applicant("b", "algebra", 1, false),
      applicant("c", "", 2, true),
    ];
    records[1].status = Status::Accepted;

    let stats = Stats::collect(&records);
    assert_eq!(stats.total, 3);
    assert_eq!((stats.pending, stats.accepted, stats.rejected), (2, 1, 0));
    assert_eq!(stats.newsletter, 2);
    assert_eq!(stats.by_field["algebra"], 2);
    assert_eq!(stats.by_field[UNSPECIFIED_FIELD], 1);
    assert_eq!(stats.by_month["2025-01"], 2);
    assert_eq!(stats.by_month["2025-02"], 1);
  }

  #[test]
  fn stats_serialise_camel_case() {
    let none: [Applicant; 0] = [];
    let json = serde_json::to_value(Stats::collect(&none)).unwrap();
    assert!(json.get("byField").is_some());
    assert!(json.get("byMonth").is_some());
  }

  #[test]
  fn csv_quotes_every_field() {
    let mut a = applicant("MEM_1_ab", "algebra", 3, false);
    a.title = "Prof \"emeritus\", retired".into();
    let csv = render_csv([&a]);
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(
      lines.next(),
      Some(
        "\"MEM_1_ab\",\"Émilie\",\"DU CHÂTELET\",\"mem_1_ab@example.org\",\"01\",\
         \"Prof \"\"emeritus\"\", retired\",\"algebra\",\"pending\",\"2025-03-02\""
      )
    );
    assert_eq!(lines.next(), None);
  }

  #[test]
  fn csv_of_nothing_is_just_the_header() {
    let none: [Applicant; 0] = [];
    assert_eq!(render_csv(&none), CSV_HEADER);
  }
}
