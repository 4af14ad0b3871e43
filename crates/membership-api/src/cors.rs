//! Permissive CORS applied to every response.

use axum::{
  extract::Request,
  http::{HeaderValue, Method, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};

/// Answer pre-flight `OPTIONS` requests directly and stamp the CORS headers
/// on everything else. Runs outside routing and authentication.
pub async fn cors(request: Request, next: Next) -> Response {
  let mut response = if request.method() == Method::OPTIONS {
    StatusCode::OK.into_response()
  } else {
    next.run(request).await
  };

  let headers = response.headers_mut();
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue::from_static("*"),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    HeaderValue::from_static("Content-Type, Authorization"),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_METHODS,
    HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
  );
  response
}
