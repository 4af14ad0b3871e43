//! Applicant records and the submission form they are built from.
//!
//! A record is created once from a validated [`Submission`]; afterwards only
//! its review state (status, update time, admin comment) ever changes.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque applicant identifier of the form `MEM_<unix-millis>_<8 hex chars>`.
///
/// Uniqueness is probabilistic. Storage adapters reject collisions instead of
/// overwriting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(String);

impl ApplicantId {
  /// Generate a fresh identifier stamped with `at`.
  pub fn generate(at: DateTime<Utc>) -> Self {
    let mut suffix = [0u8; 4];
    OsRng.fill_bytes(&mut suffix);
    Self(format!("MEM_{}_{}", at.timestamp_millis(), hex::encode(suffix)))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<String> for ApplicantId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for ApplicantId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl fmt::Display for ApplicantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(&self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review state of an application.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

impl Status {
  pub const ALL: [Status; 3] = [Status::Pending, Status::Accepted, Status::Rejected];

  /// The wire and column representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Accepted => "accepted",
      Self::Rejected => "rejected",
    }
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "pending" => Ok(Self::Pending),
      "accepted" => Ok(Self::Accepted),
      "rejected" => Ok(Self::Rejected),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

// ─── Applicant ───────────────────────────────────────────────────────────────

/// One membership application and its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
  pub id:            ApplicantId,
  pub first_name:    String,
  /// Always upper-case.
  pub last_name:     String,
  /// Always lower-case; unique across the store.
  pub email:         String,
  pub phone:         String,
  pub date_of_birth: String,
  pub nationality:   String,
  pub address:       String,
  pub city:          String,
  pub country:       String,
  pub title:         String,
  pub institution:   String,
  /// Field of interest.
  pub field:         String,
  pub presentation:  String,
  pub motivation:    String,
  pub interests:     String,
  pub links:         String,
  pub newsletter:    bool,
  pub submitted_at:  DateTime<Utc>,
  pub status:        Status,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at:    Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub admin_comment: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub client_ip:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_agent:    Option<String>,
}

impl Applicant {
  /// Apply a review decision in place.
  pub fn apply(&mut self, update: &StatusUpdate) {
    self.status = update.status;
    self.updated_at = Some(update.at);
    if let Some(comment) = &update.comment {
      self.admin_comment = Some(comment.clone());
    }
  }
}

/// A review decision: the only mutation an applicant record ever sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
  pub status:  Status,
  /// Replaces the stored comment when present.
  pub comment: Option<String>,
  pub at:      DateTime<Utc>,
}

impl StatusUpdate {
  /// A blank comment counts as no comment.
  pub fn new(status: Status, comment: Option<String>, at: DateTime<Utc>) -> Self {
    let comment = comment
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty());
    Self { status, comment, at }
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// Raw application form as posted by the client. Every field is optional at
/// this stage; [`Submission::validate`] enforces the required set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub date_of_birth: Option<String>,
  pub nationality:   Option<String>,
  pub address:       Option<String>,
  pub city:          Option<String>,
  pub country:       Option<String>,
  pub title:         Option<String>,
  pub institution:   Option<String>,
  pub field:         Option<String>,
  pub presentation:  Option<String>,
  pub motivation:    Option<String>,
  pub interests:     Option<String>,
  pub links:         Option<String>,
  #[serde(default, deserialize_with = "lenient_bool")]
  pub newsletter:    bool,
}

/// A validated, normalised submission that has not been assigned an
/// identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicant {
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
  pub client_ip:     Option<String>,
  pub user_agent:    Option<String>,
}

impl Submission {
  /// Check required fields in a fixed order, then the email format, and
  /// normalise the result.
  pub fn validate(self) -> Result<NewApplicant> {
    let first_name = required(&self.first_name, "firstName")?;
    let last_name = required(&self.last_name, "lastName")?;
    let email = required(&self.email, "email")?;
    let phone = required(&self.phone, "phone")?;
    let title = required(&self.title, "title")?;
    let field = required(&self.field, "field")?;
    let motivation = required(&self.motivation, "motivation")?;

    if !is_valid_email(email) {
      return Err(Error::InvalidEmail(email.to_owned()));
    }

    Ok(NewApplicant {
      first_name:    first_name.to_owned(),
      last_name:     last_name.to_uppercase(),
      email:         normalize_email(email),
      phone:         phone.to_owned(),
      date_of_birth: optional(self.date_of_birth),
      nationality:   optional(self.nationality),
      address:       optional(self.address),
      city:          optional(self.city),
      country:       optional(self.country),
      title:         title.to_owned(),
      institution:   optional(self.institution),
      field:         field.to_owned(),
      presentation:  optional(self.presentation),
      motivation:    motivation.to_owned(),
      interests:     optional(self.interests),
      links:         optional(self.links),
      newsletter:    self.newsletter,
      client_ip:     None,
      user_agent:    None,
    })
  }
}

impl NewApplicant {
  /// Complete the record with its identifier and submission time.
  pub fn into_applicant(self, id: ApplicantId, submitted_at: DateTime<Utc>) -> Applicant {
    Applicant {
      id,
      first_name: self.first_name,
      last_name: self.last_name,
      email: self.email,
      phone: self.phone,
      date_of_birth: self.date_of_birth,
      nationality: self.nationality,
      address: self.address,
      city: self.city,
      country: self.country,
      title: self.title,
      institution: self.institution,
      field: self.field,
      presentation: self.presentation,
      motivation: self.motivation,
      interests: self.interests,
      links: self.links,
      newsletter: self.newsletter,
      submitted_at,
      status: Status::Pending,
      updated_at: None,
      admin_comment: None,
      client_ip: self.client_ip,
      user_agent: self.user_agent,
    }
  }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or(Error::MissingField(name))
}

fn optional(value: Option<String>) -> String {
  value.map(|v| v.trim().to_owned()).unwrap_or_default()
}

/// Accepts JSON booleans plus the usual checkbox encodings (`"on"`, `"1"`…).
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  use serde_json::Value;
  Ok(match Value::deserialize(deserializer)? {
    Value::Bool(b) => b,
    Value::String(s) => {
      matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "on" | "yes" | "1")
    }
    Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    _ => false,
  })
}

// ─── Email ───────────────────────────────────────────────────────────────────

/// Canonical stored form of an email address.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// `local@domain.tld`: no whitespace, exactly one `@`, non-empty local part,
/// and a dot inside the domain with at least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  domain
    .char_indices()
    .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
