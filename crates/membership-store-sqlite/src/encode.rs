//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with nanosecond
//! precision so they round-trip exactly. Statuses are stored as their wire
//! names.

use chrono::{DateTime, SecondsFormat, Utc};
use membership_core::applicant::{Applicant, ApplicantId, Status};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<Status> { Ok(s.parse()?) }

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT`; order matches [`RawApplicant::from_row`].
pub const COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth,
  nationality, address, city, country, title, institution, field, presentation,
  motivation, interests, links, newsletter, submitted_at, status, updated_at,
  admin_comment, client_ip, user_agent";

/// Raw values read directly from an `applicants` row.
pub struct RawApplicant {
  pub id:            String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub phone:         String,
  pub date_of_birth: String,
  pub nationality:   String,
  pub address:       String,
  pub city:          String,
  pub country:       String,
  pub title:         String,
  pub institution:   String,
  pub field:         String,
  pub presentation:  String,
  pub motivation:    String,
  pub interests:     String,
  pub links:         String,
  pub newsletter:    bool,
  pub submitted_at:  String,
  pub status:        String,
  pub updated_at:    Option<String>,
  pub admin_comment: Option<String>,
  pub client_ip:     Option<String>,
  pub user_agent:    Option<String>,
}

impl RawApplicant {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      email:         row.get(3)?,
      phone:         row.get(4)?,
      date_of_birth: row.get(5)?,
      nationality:   row.get(6)?,
      address:       row.get(7)?,
      city:          row.get(8)?,
      country:       row.get(9)?,
      title:         row.get(10)?,
      institution:   row.get(11)?,
      field:         row.get(12)?,
      presentation:  row.get(13)?,
      motivation:    row.get(14)?,
      interests:     row.get(15)?,
      links:         row.get(16)?,
      newsletter:    row.get(17)?,
      submitted_at:  row.get(18)?,
      status:        row.get(19)?,
      updated_at:    row.get(20)?,
      admin_comment: row.get(21)?,
      client_ip:     row.get(22)?,
      user_agent:    row.get(23)?,
    })
  }

  pub fn into_applicant(self) -> Result<Applicant> {
    Ok(Applicant {
      id:            ApplicantId::from(self.id),
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      phone:         self.phone,
      date_of_birth: self.date_of_birth,
      nationality:   self.nationality,
      address:       self.address,
      city:          self.city,
      country:       self.country,
      title:         self.title,
      institution:   self.institution,
      field:         self.field,
      presentation:  self.presentation,
      motivation:    self.motivation,
      interests:     self.interests,
      links:         self.links,
      newsletter:    self.newsletter,
      submitted_at:  decode_dt(&self.submitted_at)?,
      status:        decode_status(&self.status)?,
      updated_at:    self.updated_at.as_deref().map(decode_dt).transpose()?,
      admin_comment: self.admin_comment,
      client_ip:     self.client_ip,
      user_agent:    self.user_agent,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_round_trip_with_nanoseconds() {
    let dt = Utc.timestamp_opt(1_735_000_000, 123_456_789).unwrap();
    let encoded = encode_dt(dt);
    assert!(encoded.ends_with(".123456789Z"), "{encoded}");
    assert_eq!(decode_dt(&encoded).unwrap(), dt);
  }

  #[test]
  fn unknown_status_is_a_core_error() {
    assert!(matches!(decode_status("maybe"), Err(Error::Core(_))));
  }
}
