//! Selecting one swimmer's records for a pool length and stroke.

use thiserror::Error;

use crate::{
  dataset::Dataset,
  record::{RaceRecord, SwimmerId},
  stroke::{PoolLength, Stroke},
};

/// Fewest records a group needs before it can be fitted.
pub const MIN_GROUP_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
  #[error("No data found for {swimmer}.")]
  NoDataFound { swimmer: SwimmerId },

  #[error(
    "Not enough data found for {swimmer}: found {found} records, need at \
     least {min}.",
    min = MIN_GROUP_SIZE
  )]
  InsufficientData { swimmer: SwimmerId, found: usize },
}

/// Identifies one fit group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
  pub swimmer:     SwimmerId,
  pub pool_length: PoolLength,
  pub stroke:      Stroke,
}

impl Dataset {
  /// Records matching `key` exactly, in table order.
  ///
  /// Matching does not case-fold; build the key's swimmer with
  /// [`SwimmerId::new`].
  pub fn filter(&self, key: &GroupKey) -> Result<Vec<&RaceRecord>, QueryError> {
    let group: Vec<&RaceRecord> = self
      .records()
      .iter()
      .filter(|r| {
        r.is_swimmer(&key.swimmer)
          && r.pool_length == key.pool_length
          && r.stroke == key.stroke
      })
      .collect();

    match group.len() {
      0 => Err(QueryError::NoDataFound { swimmer: key.swimmer.clone() }),
      found if found < MIN_GROUP_SIZE => Err(QueryError::InsufficientData {
        swimmer: key.swimmer.clone(),
        found,
      }),
      _ => Ok(group),
    }
  }
}
