//! HTTP server assembly for swimcurve: configuration and the layered router.

use std::path::{Path, PathBuf};

use axum::Router;
use config::{ConfigError, Environment};
use serde::Deserialize;
use swimcurve_api::ApiState;
use swimcurve_core::SolverConfig;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Environment variables override the file as `SWIMCURVE_<KEY>`, nested keys
/// joined with `__` (e.g. `SWIMCURVE_SOLVER__MAX_ITERATIONS`).
pub const ENV_PREFIX: &str = "SWIMCURVE";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub dataset_path:    PathBuf,
  /// Allow any origin, so a browser front-end served elsewhere can call us.
  pub cors_permissive: bool,
  pub solver:          SolverConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "0.0.0.0".to_string(),
      port:            5000,
      dataset_path:    PathBuf::from("SwimDataTop50.csv"),
      cors_permissive: true,
      solver:          SolverConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

/// The environment source with our prefix and separators.
pub fn environment() -> Environment {
  Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Load configuration from `path` (optional) layered under the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
  layered(config::File::from(path).required(false), environment())
}

fn layered<F>(file: F, env: Environment) -> Result<ServerConfig, ConfigError>
where
  F: config::Source + Send + Sync + 'static,
{
  config::Config::builder()
    .add_source(file)
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router wrapped in request tracing and, when configured, a
/// permissive CORS layer.
pub fn app(state: ApiState, config: &ServerConfig) -> Router {
  let router = swimcurve_api::api_router(state).layer(TraceLayer::new_for_http());
  if config.cors_permissive {
    router.layer(CorsLayer::permissive())
  } else {
    router
  }
}
