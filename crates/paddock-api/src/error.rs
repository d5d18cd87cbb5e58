//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. The body is `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Post not found")]
  NotFound,

  #[error("Incorrect password")]
  Forbidden,

  /// Details go to the log, not the client.
  #[error("Internal server error")]
  Internal(#[source] paddock_core::Error),
}

impl From<paddock_core::Error> for ApiError {
  fn from(e: paddock_core::Error) -> Self {
    match e {
      paddock_core::Error::NotFound(_) => Self::NotFound,
      paddock_core::Error::Forbidden(_) => Self::Forbidden,
      other => Self::Internal(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound => StatusCode::NOT_FOUND,
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, Json(json!({ "detail": self.to_string() }))).into_response()
  }
}
