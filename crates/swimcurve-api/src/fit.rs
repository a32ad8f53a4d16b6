//! Handler for `GET /requestData`.
//!
//! Fits the requested group and returns the sampled curve next to the
//! observed points:
//!
//! ```json
//! {"pred_values": [{"x": 0.0, "y": 1.9}, ...], "mes_values": [...]}
//! ```

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use swimcurve_core::{CurveFit, FitOptions, GroupKey, fit::fit_group};

use crate::{ApiState, error::ApiError, params};

#[derive(Debug, Deserialize, Default)]
pub struct FitParams {
  pub firstname:    Option<String>,
  pub lastname:     Option<String>,
  /// `25` or `50`.
  pub track_length: Option<String>,
  /// Stroke code, one of `F R B S L`.
  pub technique:    Option<String>,
  pub normalize:    Option<String>,
}

/// `GET /requestData?firstname=..&lastname=..&track_length=..&technique=..[&normalize=..]`
pub async fn handler(
  State(state): State<ApiState>,
  Query(query): Query<FitParams>,
) -> Result<Json<CurveFit>, ApiError> {
  let key = GroupKey {
    swimmer:     params::swimmer(
      query.firstname.as_deref(),
      query.lastname.as_deref(),
    )?,
    pool_length: params::pool_length(query.track_length.as_deref())?,
    stroke:      params::stroke(query.technique.as_deref())?,
  };
  let options = FitOptions {
    normalize_to_200m: params::flag("normalize", query.normalize.as_deref())?,
    solver:            state.solver,
  };

  let dataset = state.dataset.clone();
  let fit = tokio::task::spawn_blocking(move || -> Result<CurveFit, ApiError> {
    let group = dataset.filter(&key)?;
    Ok(fit_group(&group, &options)?)
  })
  .await
  .map_err(|e| ApiError::Internal(format!("fit task failed: {e}")))??;

  Ok(Json(fit))
}
