//! JSON HTTP API for swimcurve.
//!
//! Exposes an axum [`Router`] over a prepared, shared [`Dataset`]. Transport
//! concerns (TLS, CORS, request tracing) belong to the caller.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requestData` | fit one group, sample the curve |
//! | `GET`  | `/requestOptions` | which groups can be fitted |
//! | `GET`  | `/swimmers` | every swimmer in the table |
//! | `GET`  | `/health` | liveness plus record count |

pub mod error;
pub mod fit;
pub mod options;
pub mod params;
pub mod swimmers;

use std::sync::Arc;

use axum::{Router, routing::get};
use swimcurve_core::{Dataset, SolverConfig};

pub use error::ApiError;

/// Shared state for every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ApiState {
  pub dataset: Arc<Dataset>,
  pub solver:  SolverConfig,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested or layered regardless of the
/// parent's state type.
pub fn api_router(state: ApiState) -> Router<()> {
  Router::new()
    .route("/requestData", get(fit::handler))
    .route("/requestOptions", get(options::handler))
    .route("/swimmers", get(swimmers::list))
    .route("/health", get(swimmers::health))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  const TABLE: &str = "\
surname,firstname,track length,technique,distance,time
Doe,jane,25,F,50,28.3
Doe,jane,25,F,100,1:00.1
Doe,jane,25,F,200,2:05.0
Doe,jane,50,R,100,1:10.0
Doe,jane,50,R,200,2:30.0
Roe,max,50,F,50,27.0
Roe,max,50,F,100,58.0
Roe,max,50,F,200,2:04.0
Roe,max,50,F,400,4:22.0
Roe,max,25,R,100,1:05.0
";

  fn state() -> ApiState {
    ApiState {
      dataset: Arc::new(Dataset::from_reader(TABLE.as_bytes()).unwrap()),
      solver:  SolverConfig::default(),
    }
  }

  async fn get_json(uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = api_router(state()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ── /requestData ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn request_data_returns_curve_and_measurements() {
    let (status, body) = get_json(
      "/requestData?firstname=Jane&lastname=doe&track_length=25&technique=F",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let predicted = body["pred_values"].as_array().unwrap();
    assert_eq!(predicted.len(), 200);
    assert_eq!(predicted[0]["x"], 0.0);
    assert_eq!(predicted[199]["x"], 2000.0);
    assert!(predicted.iter().all(|p| p["y"].as_f64().unwrap().is_finite()));

    let measured = body["mes_values"].as_array().unwrap();
    assert_eq!(measured.len(), 3);
    assert_eq!(measured[2]["x"], 200.0);
    assert!((measured[2]["y"].as_f64().unwrap() - 1.6).abs() < 1e-12);
  }

  #[tokio::test]
  async fn request_data_normalizes_to_200m() {
    let (status, body) = get_json(
      "/requestData?firstname=max&lastname=ROE&track_length=50&technique=F&normalize=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let measured = body["mes_values"].as_array().unwrap();
    assert_eq!(measured.len(), 4);
    assert_eq!(measured[2]["y"], 1.0);
  }

  #[tokio::test]
  async fn request_data_reports_insufficient_data() {
    let (status, body) = get_json(
      "/requestData?firstname=jane&lastname=doe&track_length=50&technique=R",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      body["error"],
      "Not enough data found for jane DOE: found 2 records, need at least 3."
    );
  }

  #[tokio::test]
  async fn request_data_reports_missing_group() {
    let (status, body) = get_json(
      "/requestData?firstname=jane&lastname=doe&track_length=50&technique=S",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data found for jane DOE.");
  }

  #[tokio::test]
  async fn request_data_validates_parameters() {
    for uri in [
      "/requestData?firstname=jane&lastname=doe&track_length=25",
      "/requestData?firstname=&lastname=doe&track_length=25&technique=F",
      "/requestData?firstname=jane&lastname=doe&track_length=33&technique=F",
      "/requestData?firstname=jane&lastname=doe&track_length=25&technique=X",
      "/requestData?firstname=jane&lastname=doe&track_length=25&technique=F&normalize=maybe",
    ] {
      let (status, body) = get_json(uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      assert!(body["error"].is_string(), "{uri}: {body}");
    }
  }

  // ── /requestOptions ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn request_options_lists_all_ten_combinations() {
    let (status, body) = get_json("/requestOptions?firstname=Max&lastname=Roe").await;
    assert_eq!(status, StatusCode::OK);

    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 10);
    let available: Vec<&str> = obj
      .iter()
      .filter(|(_, v)| v.as_bool() == Some(true))
      .map(|(k, _)| k.as_str())
      .collect();
    assert_eq!(available, vec!["F-50"]);
  }

  #[tokio::test]
  async fn request_options_requires_names() {
    let (status, _) = get_json("/requestOptions?firstname=max").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── /swimmers, /health ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn swimmers_are_listed_in_table_order() {
    let (status, body) = get_json("/swimmers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["jane DOE", "max ROE"]));
  }

  #[tokio::test]
  async fn health_reports_record_count() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "ok", "records": 10 }));
  }
}
