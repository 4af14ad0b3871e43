//! Async HTTP client wrapping the membership JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use membership_core::{
  applicant::{Applicant, Status},
  report::Stats,
};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

/// Connection settings for the membership API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Including the mount path, e.g. `http://localhost:8080/api/membership`.
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// The response envelope, as seen from the client side.
#[derive(Debug, Deserialize)]
pub struct Reply<T> {
  #[serde(default)]
  pub success: bool,
  pub data:    Option<T>,
  pub error:   Option<String>,
  pub message: Option<String>,
  pub total:   Option<usize>,
  pub page:    Option<usize>,
  pub pages:   Option<usize>,
}

impl<T> Reply<T> {
  fn into_data(self, what: &str) -> Result<T> {
    self.data.ok_or_else(|| anyhow!("{what}: response carried no data"))
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Token {
  token: String,
}

/// Filters for `GET /members`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
  pub status: Option<Status>,
  pub field:  Option<String>,
  pub search: Option<String>,
  pub page:   Option<usize>,
  pub limit:  Option<usize>,
}

impl ListFilter {
  fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(status) = self.status {
      pairs.push(("status", status.to_string()));
    }
    if let Some(field) = &self.field {
      pairs.push(("field", field.clone()));
    }
    if let Some(search) = &self.search {
      pairs.push(("search", search.clone()));
    }
    if let Some(page) = self.page {
      pairs.push(("page", page.to_string()));
    }
    if let Some(limit) = self.limit {
      pairs.push(("limit", limit.to_string()));
    }
    pairs
  }
}

/// An authenticated client for the admin endpoints.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    String,
}

impl ApiClient {
  /// Build the HTTP client and exchange the configured password for a
  /// bearer token.
  pub async fn connect(config: &ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    let base_url = config.base_url.trim_end_matches('/').to_string();

    let mut body = json!({ "password": config.password });
    if !config.username.is_empty() {
      body["username"] = json!(config.username);
    }
    let request = client.post(format!("{base_url}/login")).json(&body);
    let token: Token = send(request, "POST /login").await?.into_data("POST /login")?;
    tracing::debug!("logged in to {base_url}");

    Ok(Self { client, base_url, token: token.token })
  }

  fn get(&self, path: &str) -> RequestBuilder {
    self
      .client
      .get(format!("{}{path}", self.base_url))
      .bearer_auth(&self.token)
  }

  /// `GET /members`
  pub async fn list(&self, filter: &ListFilter) -> Result<Reply<Vec<Applicant>>> {
    send(self.get("/members").query(&filter.query_pairs()), "GET /members").await
  }

  /// `GET /member/{id}`
  pub async fn show(&self, id: &str) -> Result<Applicant> {
    let what = format!("GET /member/{id}");
    send(self.get(&format!("/member/{id}")), &what)
      .await?
      .into_data(&what)
  }

  /// `PUT /update/{id}`: returns the server's confirmation message.
  pub async fn review(&self, id: &str, status: Status, comment: Option<&str>) -> Result<String> {
    let what = format!("PUT /update/{id}");
    let request = self
      .client
      .put(format!("{}/update/{id}", self.base_url))
      .bearer_auth(&self.token)
      .json(&json!({ "status": status, "comment": comment }));
    let reply: Reply<serde_json::Value> = send(request, &what).await?;
    Ok(reply.message.unwrap_or_else(|| format!("status changed to {status}")))
  }

  /// `GET /stats`
  pub async fn stats(&self) -> Result<Stats> {
    send(self.get("/stats"), "GET /stats")
      .await?
      .into_data("GET /stats")
  }

  /// `GET /export?format=csv`: the raw CSV body.
  pub async fn export_csv(&self) -> Result<String> {
    let resp = self
      .get("/export")
      .query(&[("format", "csv")])
      .send()
      .await
      .context("GET /export failed")?;

    let status = resp.status();
    if !status.is_success() {
      let reply: Option<Reply<serde_json::Value>> = resp.json().await.ok();
      let error = reply.and_then(|r| r.error).unwrap_or_default();
      return Err(anyhow!("GET /export → {status}: {error}"));
    }
    resp.text().await.context("reading export body")
  }
}

/// Send `request` and decode the envelope, turning `success: false` into an
/// error carrying the server's message.
async fn send<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<Reply<T>> {
  let resp = request
    .send()
    .await
    .with_context(|| format!("{what} failed"))?;
  let status = resp.status();
  let reply: Reply<T> = resp
    .json()
    .await
    .with_context(|| format!("{what} → {status}: unreadable response"))?;

  if !status.is_success() || !reply.success {
    let error = reply.error.as_deref().unwrap_or("unknown error");
    return Err(anyhow!("{what} → {status}: {error}"));
  }
  Ok(reply)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn list_filter_only_sends_what_is_set() {
    let filter = ListFilter {
      status: Some(Status::Accepted),
      search: Some("jean".into()),
      limit: Some(10),
      ..ListFilter::default()
    };
    assert_eq!(
      filter.query_pairs(),
      [
        ("status", "accepted".to_string()),
        ("search", "jean".to_string()),
        ("limit", "10".to_string()),
      ]
    );
    assert!(ListFilter::default().query_pairs().is_empty());
  }

  #[test]
  fn reply_decodes_paginated_envelope() {
    let raw = r#"{"success":true,"data":[],"total":0,"page":1,"pages":0}"#;
    let reply: Reply<Vec<serde_json::Value>> = serde_json::from_str(raw).unwrap();
    assert!(reply.success);
    assert_eq!(reply.pages, Some(0));
    assert!(reply.into_data("list").unwrap().is_empty());
  }

  #[test]
  fn reply_without_data_is_an_error() {
    let raw = r#"{"success":false,"error":"nope"}"#;
    let reply: Reply<serde_json::Value> = serde_json::from_str(raw).unwrap();
    assert_eq!(reply.error.as_deref(), Some("nope"));
    assert!(reply.into_data("stats").is_err());
  }
}
