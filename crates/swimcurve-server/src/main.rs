//! swimcurve server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), loads and
//! prepares the race dataset, and serves the JSON API over HTTP.
//!
//! # Checking a dataset
//!
//! To validate a dataset file without starting the server:
//!
//! ```text
//! cargo run -p swimcurve-server --bin swimcurve -- --check-dataset
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use swimcurve_api::ApiState;
use swimcurve_core::Dataset;
use swimcurve_server::{ServerConfig, app, load_config};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Swim performance curve server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load the dataset, print a summary and exit.
  #[arg(long)]
  check_dataset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg: ServerConfig = load_config(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let dataset = Dataset::load(&server_cfg.dataset_path).with_context(|| {
    format!("failed to load dataset from {:?}", server_cfg.dataset_path)
  })?;

  // Helper mode: report on the dataset and exit.
  if cli.check_dataset {
    let report = dataset.report();
    println!(
      "{}: {} rows read, {} duplicates dropped, {} records, {} swimmers",
      server_cfg.dataset_path.display(),
      report.rows_read,
      report.duplicates_dropped,
      dataset.len(),
      dataset.swimmers().len(),
    );
    return Ok(());
  }

  let state = ApiState {
    dataset: Arc::new(dataset),
    solver:  server_cfg.solver,
  };

  let app = app(state, &server_cfg);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
