//! Race-time parsing.
//!
//! Result exports mix three spellings of an elapsed time:
//!
//! | Text        | Read as               | Seconds |
//! |-------------|-----------------------|---------|
//! | `28.3`      | `ss[.fff]`            | 28.3    |
//! | `1:05.20`   | `mm:ss[.fff]`         | 65.2    |
//! | `1:02:03`   | `hh:mm:ss[.fff]`      | 3723.0  |
//!
//! Any other number of `:`-separated segments is rejected.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
  #[error("invalid time format: {0:?}")]
  InvalidTimeFormat(String),
}

/// Parse a race time into elapsed seconds.
///
/// Leading and trailing whitespace is ignored. In the `mm:ss` and `hh:mm:ss`
/// forms minutes and seconds must be below 60; a bare seconds value may be
/// any non-negative decimal.
pub fn parse_race_time(text: &str) -> Result<f64, TimeError> {
  let invalid = || TimeError::InvalidTimeFormat(text.to_string());

  let segments: Vec<&str> = text.trim().split(':').collect();
  let seconds = match segments.as_slice() {
    [s] => parse_seconds(s).ok_or_else(invalid)?,
    [m, s] => {
      let minutes = parse_sexagesimal(m).ok_or_else(invalid)?;
      let seconds = parse_seconds(s).filter(|s| *s < 60.0).ok_or_else(invalid)?;
      minutes * 60.0 + seconds
    }
    [h, m, s] => {
      let hours = parse_whole(h).ok_or_else(invalid)?;
      let minutes = parse_sexagesimal(m).ok_or_else(invalid)?;
      let seconds = parse_seconds(s).filter(|s| *s < 60.0).ok_or_else(invalid)?;
      hours * 3600.0 + minutes * 60.0 + seconds
    }
    _ => return Err(invalid()),
  };

  Ok(seconds)
}

fn is_digits(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Unsigned integer segment (hours).
fn parse_whole(s: &str) -> Option<f64> {
  if !is_digits(s) {
    return None;
  }
  s.parse::<u64>().ok().map(|v| v as f64)
}

/// Unsigned integer segment below 60 (minutes).
fn parse_sexagesimal(s: &str) -> Option<f64> {
  parse_whole(s).filter(|v| *v < 60.0)
}

/// Unsigned decimal `digits[.digits]` (seconds).
///
/// Checked by hand before handing off to `f64::from_str`, which would also
/// accept signs, exponents, `inf` and `nan`.
fn parse_seconds(s: &str) -> Option<f64> {
  let well_formed = match s.split_once('.') {
    Some((whole, frac)) => is_digits(whole) && is_digits(frac),
    None => is_digits(s),
  };
  if !well_formed {
    return None;
  }
  s.parse::<f64>().ok()
}
