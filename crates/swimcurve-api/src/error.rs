//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use swimcurve_core::{FitError, QueryError};
use thiserror::Error;

/// Message returned for every solver failure; the detail goes to the log.
pub const FIT_FAILED: &str = "Curve fit failed.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Query(#[from] QueryError),

  #[error(transparent)]
  Fit(#[from] FitError),

  #[error("internal error: {0}")]
  Internal(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Query(e) => (StatusCode::BAD_REQUEST, e.to_string()),
      ApiError::Fit(e) => {
        tracing::warn!(error = %e, "curve fit failed");
        (StatusCode::INTERNAL_SERVER_ERROR, FIT_FAILED.to_string())
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
