//! Handlers for `GET /swimmers` and `GET /health`.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::ApiState;

/// `GET /swimmers`: every swimmer as `"first SURNAME"`, in table order.
pub async fn list(State(state): State<ApiState>) -> Json<Vec<String>> {
  Json(
    state
      .dataset
      .swimmers()
      .iter()
      .map(ToString::to_string)
      .collect(),
  )
}

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:  &'static str,
  pub records: usize,
}

/// `GET /health`
pub async fn health(State(state): State<ApiState>) -> Json<Health> {
  Json(Health { status: "ok", records: state.dataset.len() })
}
