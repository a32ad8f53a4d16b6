//! Error types for `swimcurve-core`.

use thiserror::Error;

pub use crate::{
  dataset::DatasetError,
  fit::FitError,
  query::QueryError,
  stroke::{ParsePoolLengthError, ParseStrokeError},
  time::TimeError,
};

/// Any failure produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Time(#[from] TimeError),

  #[error(transparent)]
  Dataset(#[from] DatasetError),

  #[error(transparent)]
  Query(#[from] QueryError),

  #[error(transparent)]
  Fit(#[from] FitError),

  #[error(transparent)]
  Stroke(#[from] ParseStrokeError),

  #[error(transparent)]
  PoolLength(#[from] ParsePoolLengthError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{record::SwimmerId, stroke::Stroke, time::parse_race_time};

  fn parse_pair(time: &str, stroke: &str) -> Result<(f64, Stroke)> {
    Ok((parse_race_time(time)?, stroke.parse()?))
  }

  #[test]
  fn module_errors_convert_into_the_crate_error() {
    assert!(matches!(parse_pair("1:2:3:4", "F"), Err(Error::Time(_))));
    assert!(matches!(parse_pair("1:00", "Q"), Err(Error::Stroke(_))));

    let err: Error = QueryError::NoDataFound { swimmer: SwimmerId::new("jane", "doe") }.into();
    assert_eq!(err.to_string(), "No data found for jane DOE.");
  }
}
