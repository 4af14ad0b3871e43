//! The JSON envelope every endpoint answers with.

use membership_core::query::Page;
use serde::Serialize;

/// `{ success, data?, error?, message?, total?, page?, pages? }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total:   Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page:    Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pages:   Option<usize>,
}

impl<T> Envelope<T> {
  pub fn data(data: T) -> Self {
    Self {
      success: true,
      data:    Some(data),
      error:   None,
      message: None,
      total:   None,
      page:    None,
      pages:   None,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }
}

impl<T> Envelope<Vec<T>> {
  /// One page of results plus its position in the full result set.
  pub fn paginated(page: Page<T>) -> Self {
    Self {
      total: Some(page.total),
      page: Some(page.page),
      pages: Some(page.pages),
      ..Self::data(page.items)
    }
  }
}

impl Envelope<()> {
  pub fn error(message: impl Into<String>) -> Self {
    Self {
      success: false,
      data:    None,
      error:   Some(message.into()),
      message: None,
      total:   None,
      page:    None,
      pages:   None,
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn error_envelope_omits_absent_fields() {
    let v = serde_json::to_value(Envelope::<()>::error("nope")).unwrap();
    assert_eq!(v, json!({ "success": false, "error": "nope" }));
  }

  #[test]
  fn paginated_envelope_carries_counts() {
    let page = Page { total: 3, page: 2, pages: 3, items: vec![2] };
    let v = serde_json::to_value(Envelope::paginated(page)).unwrap();
    assert_eq!(
      v,
      json!({ "success": true, "data": [2], "total": 3, "page": 2, "pages": 3 })
    );
  }
}
