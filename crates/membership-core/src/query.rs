//! List filters and pagination.

use serde::Serialize;

use crate::applicant::{Applicant, Status};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Filters for [`crate::store::RecordStore::find_all`], applied in the order
/// status → field → search. The default query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantQuery {
  /// Exact status match.
  pub status: Option<Status>,
  /// Exact field-of-interest match.
  pub field:  Option<String>,
  /// Case-insensitive substring of first name, last name or email.
  pub search: Option<String>,
}

impl ApplicantQuery {
  pub fn matches(&self, applicant: &Applicant) -> bool {
    self.status.is_none_or(|s| applicant.status == s)
      && self.field.as_deref().is_none_or(|f| applicant.field == f)
      && self.matches_search(applicant)
  }

  /// Only the free-text part of the filter.
  pub fn matches_search(&self, applicant: &Applicant) -> bool {
    let Some(needle) = self.search.as_deref() else {
      return true;
    };
    let needle = needle.to_lowercase();
    [&applicant.first_name, &applicant.last_name, &applicant.email]
      .into_iter()
      .any(|haystack| haystack.to_lowercase().contains(&needle))
  }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub page:  usize,
  pub limit: usize,
}

impl Default for Pagination {
  fn default() -> Self {
    Self {
      page:  1,
      limit: Self::DEFAULT_LIMIT,
    }
  }
}

impl Pagination {
  pub const DEFAULT_LIMIT: usize = 50;

  /// Parse raw query values. Missing, non-numeric and non-positive values fall
  /// back to page 1 and [`Self::DEFAULT_LIMIT`].
  pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
    let positive = |raw: Option<&str>| {
      raw
        .and_then(|r| r.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
    };
    Self {
      page:  positive(page).unwrap_or(1),
      limit: positive(limit).unwrap_or(Self::DEFAULT_LIMIT),
    }
  }

  /// Slice `[(page-1)*limit, page*limit)` out of the full filtered set.
  pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
    let total = items.len();
    let start = (self.page - 1).saturating_mul(self.limit);
    let items = items.into_iter().skip(start).take(self.limit).collect();
    Page {
      total,
      page: self.page,
      pages: total.div_ceil(self.limit),
      items,
    }
  }
}

/// One page of a filtered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
  /// Size of the whole filtered set.
  pub total: usize,
  pub page:  usize,
  pub pages: usize,
  pub items: Vec<T>,
}
