//! Extractors that answer with the API envelope on failure.

use axum::{
  extract::{FromRequest, FromRequestParts, Path, Query, Request},
  http::request::Parts,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Like [`axum::Json`], but an empty body reads as `{}`, no `Content-Type`
/// is required, and anything other than a JSON object becomes
/// [`ApiError::Validation`].
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let bytes = Bytes::from_request(req, state)
      .await
      .map_err(|e| ApiError::Validation(e.body_text()))?;

    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
      Value::Object(serde_json::Map::new())
    } else {
      serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Validation(format!("invalid request body: {e}")))?
    };
    // Derived struct visitors also accept arrays as positional fields.
    if !value.is_object() {
      return Err(ApiError::Validation("request body must be a JSON object".into()));
    }
    serde_json::from_value(value)
      .map(JsonBody)
      .map_err(|e| ApiError::Validation(format!("invalid request body: {e}")))
  }
}

/// [`Query`] with its rejection mapped to [`ApiError::Validation`].
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    Query::<T>::from_request_parts(parts, state)
      .await
      .map(|Query(params)| QueryParams(params))
      .map_err(|e| ApiError::Validation(e.body_text()))
  }
}

/// [`Path`] with its rejection mapped to [`ApiError::Validation`].
pub struct PathParam<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParam<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    Path::<T>::from_request_parts(parts, state)
      .await
      .map(|Path(param)| PathParam(param))
      .map_err(|e| ApiError::Validation(e.body_text()))
  }
}

#[cfg(test)]
mod tests {
  use axum::body::Body;
  use serde::Deserialize;

  use super::*;

  #[derive(Debug, Deserialize, PartialEq)]
  struct Named {
    name: Option<String>,
  }

  #[derive(Debug, Deserialize, PartialEq)]
  struct Pair {
    first:  String,
    second: String,
  }

  async fn extract<T: DeserializeOwned>(body: &'static str) -> Result<T, ApiError> {
    let req = Request::builder().body(Body::from(body)).unwrap();
    JsonBody::<T>::from_request(req, &()).await.map(|JsonBody(p)| p)
  }

  async fn query<T: DeserializeOwned>(uri: &str) -> Result<T, ApiError> {
    let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
    QueryParams::<T>::from_request_parts(&mut parts, &())
      .await
      .map(|QueryParams(p)| p)
  }

  #[tokio::test]
  async fn empty_body_is_an_empty_object() {
    assert_eq!(extract::<Named>("").await.unwrap(), Named { name: None });
    assert_eq!(extract::<Named>("  \n").await.unwrap(), Named { name: None });
  }

  #[tokio::test]
  async fn object_is_decoded_without_content_type() {
    let named: Named = extract(r#"{"name":"x"}"#).await.unwrap();
    assert_eq!(named.name.as_deref(), Some("x"));
  }

  #[tokio::test]
  async fn malformed_json_is_a_validation_error() {
    assert!(matches!(extract::<Named>("{ nope").await, Err(ApiError::Validation(_))));
  }

  #[tokio::test]
  async fn well_typed_array_is_still_rejected() {
    assert!(matches!(
      extract::<Pair>(r#"["a", "b"]"#).await,
      Err(ApiError::Validation(_))
    ));
    assert!(matches!(extract::<Named>("null").await, Err(ApiError::Validation(_))));
    assert!(matches!(extract::<Named>("42").await, Err(ApiError::Validation(_))));
  }

  #[tokio::test]
  async fn repeated_query_key_is_a_validation_error() {
    let result = query::<Named>("/x?name=a&name=b").await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let ok: Named = query("/x?name=a").await.unwrap();
    assert_eq!(ok.name.as_deref(), Some("a"));
  }
}
