//! Which stroke/pool groups a swimmer has enough data to fit.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
  dataset::Dataset,
  query::MIN_GROUP_SIZE,
  record::SwimmerId,
  stroke::{PoolLength, Stroke},
};

/// Fittability of all ten `(stroke, pool length)` combinations.
///
/// Serialises as an object keyed `"<code>-<pool>"`, e.g. `{"F-25": true, ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<String, bool>")]
pub struct StrokeOptions {
  available: [[bool; 2]; 5],
}

impl StrokeOptions {
  // Both enums are declared in their `ALL` order.
  fn index(pool: PoolLength, stroke: Stroke) -> (usize, usize) {
    (stroke as usize, pool as usize)
  }

  pub fn get(&self, pool: PoolLength, stroke: Stroke) -> bool {
    let (s, p) = Self::index(pool, stroke);
    self.available[s][p]
  }

  fn set(&mut self, pool: PoolLength, stroke: Stroke) {
    let (s, p) = Self::index(pool, stroke);
    self.available[s][p] = true;
  }

  /// Every combination in stroke code order, 25 m before 50 m.
  pub fn iter(&self) -> impl Iterator<Item = (Stroke, PoolLength, bool)> + '_ {
    Stroke::ALL.into_iter().flat_map(move |stroke| {
      PoolLength::ALL
        .into_iter()
        .map(move |pool| (stroke, pool, self.get(pool, stroke)))
    })
  }

  pub fn key(stroke: Stroke, pool: PoolLength) -> String {
    format!("{}-{}", stroke.code(), pool.meters())
  }
}

impl From<StrokeOptions> for BTreeMap<String, bool> {
  fn from(options: StrokeOptions) -> Self {
    options
      .iter()
      .map(|(stroke, pool, available)| (StrokeOptions::key(stroke, pool), available))
      .collect()
  }
}

impl Dataset {
  /// Report which groups hold at least [`MIN_GROUP_SIZE`] records for
  /// `swimmer`. An unknown swimmer reports nothing available.
  pub fn options(&self, swimmer: &SwimmerId) -> StrokeOptions {
    let mut counts: HashMap<(PoolLength, Stroke), usize> = HashMap::new();
    for record in self.records().iter().filter(|r| r.is_swimmer(swimmer)) {
      *counts.entry((record.pool_length, record.stroke)).or_default() += 1;
    }

    let mut options = StrokeOptions::default();
    for ((pool, stroke), count) in counts {
      if count >= MIN_GROUP_SIZE {
        options.set(pool, stroke);
      }
    }
    options
  }
}
