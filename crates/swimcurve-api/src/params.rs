//! Query-string validation shared by the handlers.
//!
//! Every parameter arrives as an optional string so that a missing value
//! produces our own 400 message instead of the extractor's plain-text
//! rejection.

use swimcurve_core::{PoolLength, Stroke, SwimmerId};

use crate::error::ApiError;

/// The value of a required parameter, trimmed and non-empty.
pub fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(ApiError::BadRequest(format!("missing required parameter `{name}`"))),
  }
}

pub fn swimmer(
  firstname: Option<&str>,
  lastname: Option<&str>,
) -> Result<SwimmerId, ApiError> {
  let first = required("firstname", firstname)?;
  let last = required("lastname", lastname)?;
  Ok(SwimmerId::new(first, last))
}

pub fn pool_length(value: Option<&str>) -> Result<PoolLength, ApiError> {
  required("track_length", value)?
    .parse()
    .map_err(|e| ApiError::BadRequest(format!("invalid `track_length`: {e}")))
}

pub fn stroke(value: Option<&str>) -> Result<Stroke, ApiError> {
  required("technique", value)?
    .parse()
    .map_err(|e| ApiError::BadRequest(format!("invalid `technique`: {e}")))
}

/// Optional flag; absent or blank means `false`.
pub fn flag(name: &str, value: Option<&str>) -> Result<bool, ApiError> {
  match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
    None | Some("") | Some("false") | Some("0") => Ok(false),
    Some("true") | Some("1") => Ok(true),
    Some(other) => Err(ApiError::BadRequest(format!(
      "invalid `{name}`: {other:?}; expected true, false, 1 or 0"
    ))),
  }
}
