//! Core types and algorithms for swimcurve.
//!
//! This crate has no HTTP dependencies. It owns the whole data pipeline:
//! race-time parsing, dataset preparation, group filtering, the rational
//! speed-curve fit, and the per-swimmer option report.
//!
//! The prepared [`Dataset`] is immutable; share it behind an `Arc` and call
//! its `&self` operations from as many threads as you like.

pub mod dataset;
pub mod error;
pub mod fit;
pub mod options;
pub mod query;
pub mod record;
pub mod stroke;
pub mod time;

pub use dataset::{Dataset, LoadReport};
pub use error::{Error, Result};
pub use fit::{CurveFit, FitError, FitOptions, FitResult, Point, SolverConfig};
pub use options::StrokeOptions;
pub use query::{GroupKey, MIN_GROUP_SIZE, QueryError};
pub use record::{RaceRecord, SwimmerId};
pub use stroke::{PoolLength, Stroke};
