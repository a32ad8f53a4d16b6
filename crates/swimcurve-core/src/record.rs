//! Race records and swimmer identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stroke::{PoolLength, Stroke};

/// Who swam: the `(first_name, surname)` pair in its normalized form.
///
/// First names are stored lower-case and surnames upper-case, so matching on
/// a `SwimmerId` is case-insensitive with respect to the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SwimmerId {
  pub first_name: String,
  pub surname:    String,
}

impl SwimmerId {
  /// Build an identity from raw text, trimming and case-folding both parts.
  pub fn new(first_name: &str, surname: &str) -> Self {
    Self {
      first_name: first_name.trim().to_lowercase(),
      surname:    surname.trim().to_uppercase(),
    }
  }
}

impl fmt::Display for SwimmerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.first_name, self.surname)
  }
}

/// One measured swim: a distance covered in a pool with a given stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
  pub surname:          String,
  pub first_name:       String,
  pub pool_length:      PoolLength,
  pub stroke:           Stroke,
  /// Meters.
  pub distance:         f64,
  pub duration_seconds: f64,
  /// `distance / duration_seconds`, in m/s.
  pub speed:            f64,
}

impl RaceRecord {
  pub fn is_swimmer(&self, swimmer: &SwimmerId) -> bool {
    self.first_name == swimmer.first_name && self.surname == swimmer.surname
  }

  pub fn swimmer(&self) -> SwimmerId {
    SwimmerId {
      first_name: self.first_name.clone(),
      surname:    self.surname.clone(),
    }
  }
}
