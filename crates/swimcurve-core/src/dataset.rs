//! Dataset preparation: CSV ingest, speed derivation and deduplication.
//!
//! Pipeline, per row in source order:
//!   CSV record
//!     └─ deserialize RawRow      (malformed row → fatal)
//!          └─ parse_race_time()  (bad time → fatal)
//!               └─ validate       (pool, stroke, distance > 0, duration > 0)
//!                    └─ normalize names, derive speed
//!                         └─ dedup on (surname, first, distance, stroke, pool)
//!
//! Any error aborts the whole load; there is no partially loaded dataset.

use std::{
  collections::HashSet,
  fs::File,
  io,
  path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
  record::{RaceRecord, SwimmerId},
  stroke::{PoolLength, Stroke},
  time::{TimeError, parse_race_time},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DatasetError {
  #[error("dataset unavailable at {}: {source}", path.display())]
  Unavailable {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("dataset contains no records")]
  Empty,

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("line {line}: malformed row: {source}")]
  MalformedRow {
    line:   u64,
    #[source]
    source: csv::Error,
  },

  #[error("line {line}: {source}")]
  InvalidTime {
    line:   u64,
    #[source]
    source: TimeError,
  },

  #[error("line {line}: {reason}")]
  InvalidRecord { line: u64, reason: String },
}

// ─── Raw input ───────────────────────────────────────────────────────────────

/// One row of the source table, before any validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
  pub surname:     String,
  #[serde(rename = "firstname")]
  pub first_name:  String,
  #[serde(rename = "track length")]
  pub pool_length: u32,
  #[serde(rename = "technique")]
  pub stroke:      String,
  pub distance:    f64,
  pub time:        String,
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// Counters gathered while preparing a [`Dataset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub rows_read:          usize,
  pub duplicates_dropped: usize,
}

/// The prepared, deduplicated race table.
///
/// Built once; every operation afterwards takes `&self`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  records: Vec<RaceRecord>,
  report:  LoadReport,
}

type DedupKey = (String, String, u64, Stroke, PoolLength);

impl Dataset {
  /// Load and prepare the CSV file at `path`.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Unavailable {
      path: path.to_path_buf(),
      source,
    })?;
    let dataset = Self::from_reader(file)?;

    tracing::info!(
      path = %path.display(),
      rows = dataset.report.rows_read,
      records = dataset.records.len(),
      duplicates = dataset.report.duplicates_dropped,
      swimmers = dataset.swimmers().len(),
      "dataset loaded"
    );
    Ok(dataset)
  }

  /// Prepare a dataset from CSV text with a header row.
  pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
      .trim(csv::Trim::All)
      .from_reader(reader);
    let headers = reader.headers()?.clone();

    let rows = reader.records().map(|result| -> Result<_, DatasetError> {
      let record = result?;
      let line = record.position().map_or(0, |p| p.line());
      let raw = record
        .deserialize::<RawRow>(Some(&headers))
        .map_err(|source| DatasetError::MalformedRow { line, source })?;
      Ok((line, raw))
    });

    Self::prepare(rows)
  }

  /// Prepare a dataset from already-deserialized rows.
  ///
  /// Rows are numbered as if they followed a header line, so error messages
  /// line up with the CSV they came from.
  pub fn from_raw_rows(
    rows: impl IntoIterator<Item = RawRow>,
  ) -> Result<Self, DatasetError> {
    Self::prepare(
      rows
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| Ok((idx as u64 + 2, raw))),
    )
  }

  fn prepare(
    rows: impl Iterator<Item = Result<(u64, RawRow), DatasetError>>,
  ) -> Result<Self, DatasetError> {
    let mut records = Vec::new();
    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut report = LoadReport::default();

    for row in rows {
      let (line, raw) = row?;
      report.rows_read += 1;

      let record = prepare_row(line, raw)?;
      let key = (
        record.surname.clone(),
        record.first_name.clone(),
        record.distance.to_bits(),
        record.stroke,
        record.pool_length,
      );
      if seen.insert(key) {
        records.push(record);
      } else {
        report.duplicates_dropped += 1;
      }
    }

    if records.is_empty() {
      return Err(DatasetError::Empty);
    }

    Ok(Self { records, report })
  }

  pub fn records(&self) -> &[RaceRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn report(&self) -> LoadReport {
    self.report
  }

  /// Every distinct swimmer, in order of first appearance.
  pub fn swimmers(&self) -> Vec<SwimmerId> {
    let mut seen = HashSet::new();
    self
      .records
      .iter()
      .filter(|r| seen.insert((r.first_name.as_str(), r.surname.as_str())))
      .map(RaceRecord::swimmer)
      .collect()
  }
}

fn prepare_row(line: u64, raw: RawRow) -> Result<RaceRecord, DatasetError> {
  let invalid = |reason: String| DatasetError::InvalidRecord { line, reason };

  let duration_seconds = parse_race_time(&raw.time)
    .map_err(|source| DatasetError::InvalidTime { line, source })?;
  let pool_length =
    PoolLength::try_from(raw.pool_length).map_err(|e| invalid(e.to_string()))?;
  let stroke = Stroke::from_source(&raw.stroke).map_err(|e| invalid(e.to_string()))?;

  if !(raw.distance.is_finite() && raw.distance > 0.0) {
    return Err(invalid(format!("distance must be positive, got {}", raw.distance)));
  }
  if duration_seconds <= 0.0 {
    return Err(invalid(format!("time {:?} is zero", raw.time)));
  }

  let swimmer = SwimmerId::new(&raw.first_name, &raw.surname);
  if swimmer.first_name.is_empty() || swimmer.surname.is_empty() {
    return Err(invalid("swimmer name is empty".to_string()));
  }

  Ok(RaceRecord {
    surname: swimmer.surname,
    first_name: swimmer.first_name,
    pool_length,
    stroke,
    distance: raw.distance,
    duration_seconds,
    speed: raw.distance / duration_seconds,
  })
}
