//! Stroke and pool-length enumerations.
//!
//! Both are closed sets. Conversions are exhaustive tables; unknown codes are
//! rejected at the boundary instead of falling through a lookup.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Stroke ──────────────────────────────────────────────────────────────────

/// A swim technique.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Stroke {
  #[serde(rename = "F")]
  Freestyle,
  #[serde(rename = "R")]
  Backstroke,
  #[serde(rename = "B")]
  Breaststroke,
  #[serde(rename = "S")]
  Butterfly,
  #[serde(rename = "L")]
  Medley,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stroke {0:?}; expected one of F, R, B, S, L")]
pub struct ParseStrokeError(pub String);

impl Stroke {
  /// All strokes in code order `F, R, B, S, L`.
  pub const ALL: [Stroke; 5] = [
    Stroke::Freestyle,
    Stroke::Backstroke,
    Stroke::Breaststroke,
    Stroke::Butterfly,
    Stroke::Medley,
  ];

  /// The single-letter code used on the wire and in source files.
  pub const fn code(self) -> char {
    match self {
      Stroke::Freestyle => 'F',
      Stroke::Backstroke => 'R',
      Stroke::Breaststroke => 'B',
      Stroke::Butterfly => 'S',
      Stroke::Medley => 'L',
    }
  }

  pub const fn from_code(code: char) -> Option<Stroke> {
    match code.to_ascii_uppercase() {
      'F' => Some(Stroke::Freestyle),
      'R' => Some(Stroke::Backstroke),
      'B' => Some(Stroke::Breaststroke),
      'S' => Some(Stroke::Butterfly),
      'L' => Some(Stroke::Medley),
      _ => None,
    }
  }

  pub const fn name(self) -> &'static str {
    match self {
      Stroke::Freestyle => "Freestyle",
      Stroke::Backstroke => "Backstroke",
      Stroke::Breaststroke => "Breaststroke",
      Stroke::Butterfly => "Butterfly",
      Stroke::Medley => "Medley",
    }
  }

  /// Label used by the German federation exports the dataset comes from.
  pub const fn export_label(self) -> &'static str {
    match self {
      Stroke::Freestyle => "Freistil",
      Stroke::Backstroke => "Rücken",
      Stroke::Breaststroke => "Brust",
      Stroke::Butterfly => "Schmetterling",
      Stroke::Medley => "Lagen",
    }
  }

  /// Parse a source-file technique column: a code, an English name, or an
  /// export label.
  pub fn from_source(value: &str) -> Result<Stroke, ParseStrokeError> {
    let value = value.trim();
    if let Ok(stroke) = value.parse::<Stroke>() {
      return Ok(stroke);
    }
    Stroke::ALL
      .into_iter()
      .find(|s| {
        s.name().eq_ignore_ascii_case(value)
          || s.export_label().to_lowercase() == value.to_lowercase()
      })
      .ok_or_else(|| ParseStrokeError(value.to_string()))
  }
}

/// Parses exactly one code letter (case-insensitive, surrounding whitespace
/// ignored).
impl FromStr for Stroke {
  type Err = ParseStrokeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut chars = s.trim().chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) => {
        Stroke::from_code(c).ok_or_else(|| ParseStrokeError(s.to_string()))
      }
      _ => Err(ParseStrokeError(s.to_string())),
    }
  }
}

impl fmt::Display for Stroke {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Pool length ─────────────────────────────────────────────────────────────

/// Length of the pool a race was swum in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u32", try_from = "u32")]
pub enum PoolLength {
  /// 25 m
  Short,
  /// 50 m
  Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pool length {0:?}; expected 25 or 50")]
pub struct ParsePoolLengthError(pub String);

impl PoolLength {
  pub const ALL: [PoolLength; 2] = [PoolLength::Short, PoolLength::Long];

  pub const fn meters(self) -> u32 {
    match self {
      PoolLength::Short => 25,
      PoolLength::Long => 50,
    }
  }
}

impl TryFrom<u32> for PoolLength {
  type Error = ParsePoolLengthError;

  fn try_from(meters: u32) -> Result<Self, Self::Error> {
    match meters {
      25 => Ok(PoolLength::Short),
      50 => Ok(PoolLength::Long),
      other => Err(ParsePoolLengthError(other.to_string())),
    }
  }
}

impl From<PoolLength> for u32 {
  fn from(pool: PoolLength) -> Self {
    pool.meters()
  }
}

impl FromStr for PoolLength {
  type Err = ParsePoolLengthError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "25" => Ok(PoolLength::Short),
      "50" => Ok(PoolLength::Long),
      _ => Err(ParsePoolLengthError(s.to_string())),
    }
  }
}

impl fmt::Display for PoolLength {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.meters())
  }
}
