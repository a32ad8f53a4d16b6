//! Handler for `GET /requestOptions`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use swimcurve_core::StrokeOptions;

use crate::{ApiState, error::ApiError, params};

#[derive(Debug, Deserialize, Default)]
pub struct OptionsParams {
  pub firstname: Option<String>,
  pub lastname:  Option<String>,
}

/// `GET /requestOptions?firstname=..&lastname=..`
pub async fn handler(
  State(state): State<ApiState>,
  Query(query): Query<OptionsParams>,
) -> Result<Json<StrokeOptions>, ApiError> {
  let swimmer =
    params::swimmer(query.firstname.as_deref(), query.lastname.as_deref())?;
  Ok(Json(state.dataset.options(&swimmer)))
}
