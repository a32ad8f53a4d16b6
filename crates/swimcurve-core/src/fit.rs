//! Rational speed-curve fitting.
//!
//! Model:
//!
//! ```text
//! speed(d) = 1 / (a·d + b) + c
//! ```
//!
//! The parameters minimise the sum of squared speed residuals over a group's
//! observed `(distance, speed)` points. The solver is Levenberg–Marquardt on
//! the 3×3 normal equations with Marquardt's diagonal scaling.
//!
//! Starting points matter for this model: the pole at `d = -b/a` cannot be
//! moved across an observed distance without the cost blowing up, so a
//! single start can get stuck on the wrong side. Every fit therefore runs
//! from two starts and keeps the better solution:
//!
//! - a linearised guess: pick `c0` just below the slowest speed, then
//!   `1 / (speed - c0)` is linear in distance and OLS gives `a0, b0`;
//! - the exact interpolant through the first, middle and last points (by
//!   distance). For three points this already is the least-squares answer.
//!
//! Termination follows MINPACK's `lmdif` conventions (relative cost
//! reduction and relative step size under tolerance), plus an iteration cap.

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RaceRecord;

/// Minimum number of points for a non-degenerate three-parameter fit.
pub const MIN_POINTS: usize = 3;

/// Number of samples on the predicted curve.
pub const SAMPLE_COUNT: usize = 200;

/// The predicted curve spans `[0, SAMPLE_MAX_DISTANCE]` meters inclusive.
pub const SAMPLE_MAX_DISTANCE: f64 = 2000.0;

/// Speeds are normalised against the record at (or nearest to) this distance.
pub const REFERENCE_DISTANCE: f64 = 200.0;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
  #[error("need at least {min} points to fit, got {0}", min = MIN_POINTS)]
  TooFewPoints(usize),

  #[error("point {index} is not finite")]
  NonFinitePoint { index: usize },

  #[error("fit did not converge within {iterations} iterations")]
  DidNotConverge { iterations: usize },

  #[error("fitted model is undefined at distance {distance}")]
  Singularity { distance: f64 },
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// Solver limits and tolerances.
///
/// Defaults mirror MINPACK (`ftol = xtol = 1.49012e-8`, `gtol = 0`) with a
/// generous iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
  pub max_iterations: usize,
  /// Stop when an accepted step reduces the cost by at most `ftol` relative.
  pub ftol:           f64,
  /// Stop when an accepted step is at most `xtol` relative to the parameters.
  pub xtol:           f64,
  /// Stop when every gradient component is at most `gtol` in magnitude.
  pub gtol:           f64,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      max_iterations: 20_000,
      ftol:           1.49012e-8,
      xtol:           1.49012e-8,
      gtol:           0.0,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitOptions {
  /// Divide every speed by the speed nearest to 200 m before fitting.
  pub normalize_to_200m: bool,
  pub solver:            SolverConfig,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// A `(distance, speed)` pair; serialises as `{"x": .., "y": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

/// Fitted parameters of `1 / (a·d + b) + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
  pub a:                       f64,
  pub b:                       f64,
  pub c:                       f64,
  /// Parameter covariance `(JᵀJ)⁻¹ · SSR / (n − 3)`, ordered `(a, b, c)`.
  ///
  /// `None` when there are no residual degrees of freedom (exactly three
  /// points) or `JᵀJ` is singular at the solution.
  pub covariance:              Option<Matrix3<f64>>,
  pub iterations:              usize,
  pub residual_sum_of_squares: f64,
}

impl FitResult {
  fn params(&self) -> Vector3<f64> {
    Vector3::new(self.a, self.b, self.c)
  }

  /// Evaluate the model; `None` where it is undefined.
  pub fn predict(&self, distance: f64) -> Option<f64> {
    let denominator = self.a * distance + self.b;
    if denominator == 0.0 {
      return None;
    }
    let speed = 1.0 / denominator + self.c;
    speed.is_finite().then_some(speed)
  }

  /// Sample the model at [`SAMPLE_COUNT`] evenly spaced distances over
  /// `[0, SAMPLE_MAX_DISTANCE]`.
  pub fn sample(&self) -> Result<Vec<Point>, FitError> {
    let last = (SAMPLE_COUNT - 1) as f64;
    (0..SAMPLE_COUNT)
      .map(|i| SAMPLE_MAX_DISTANCE * i as f64 / last)
      .map(|x| self.point_at(x))
      .collect()
  }

  fn point_at(&self, distance: f64) -> Result<Point, FitError> {
    self
      .predict(distance)
      .map(|y| Point { x: distance, y })
      .ok_or(FitError::Singularity { distance })
  }
}

/// A fitted group: parameters, the sampled curve, and the points it was
/// fitted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveFit {
  #[serde(skip)]
  pub params:    FitResult,
  #[serde(rename = "pred_values")]
  pub predicted: Vec<Point>,
  /// Observed points, normalised when requested.
  #[serde(rename = "mes_values")]
  pub measured:  Vec<Point>,
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Fit one group of records and sample the resulting curve.
///
/// Records are expected to share a swimmer, pool length and stroke; the
/// query filter guarantees that.
pub fn fit_group(
  records: &[&RaceRecord],
  options: &FitOptions,
) -> Result<CurveFit, FitError> {
  if records.len() < MIN_POINTS {
    return Err(FitError::TooFewPoints(records.len()));
  }

  let mut measured: Vec<Point> = records
    .iter()
    .map(|r| Point { x: r.distance, y: r.speed })
    .collect();

  if options.normalize_to_200m {
    let reference = reference_speed(&measured);
    for point in &mut measured {
      point.y /= reference;
    }
  }

  let params = fit_points(&measured, &options.solver)?;
  for point in &measured {
    params.point_at(point.x)?;
  }
  let predicted = params.sample()?;

  tracing::debug!(
    a = params.a,
    b = params.b,
    c = params.c,
    iterations = params.iterations,
    ssr = params.residual_sum_of_squares,
    points = measured.len(),
    "fitted speed curve"
  );

  Ok(CurveFit { params, predicted, measured })
}

/// Least-squares fit of the rational model to raw points.
pub fn fit_points(
  points: &[Point],
  config: &SolverConfig,
) -> Result<FitResult, FitError> {
  if points.len() < MIN_POINTS {
    return Err(FitError::TooFewPoints(points.len()));
  }
  if let Some(index) = points
    .iter()
    .position(|p| !(p.x.is_finite() && p.y.is_finite()))
  {
    return Err(FitError::NonFinitePoint { index });
  }

  let starts = [Some(linearized_start(points)), interpolant_start(points)];

  let mut best: Option<Solution> = None;
  let mut first_err = None;
  for start in starts.into_iter().flatten() {
    match levenberg_marquardt(start, points, config) {
      Ok(solution) => {
        if best.as_ref().is_none_or(|b| solution.cost < b.cost) {
          best = Some(solution);
        }
      }
      Err(e) => {
        first_err.get_or_insert(e);
      }
    }
  }

  let Some(solution) = best else {
    return Err(first_err.unwrap_or(FitError::DidNotConverge { iterations: 0 }));
  };

  Ok(FitResult {
    a:                       solution.params[0],
    b:                       solution.params[1],
    c:                       solution.params[2],
    covariance:              covariance(&solution, points),
    iterations:              solution.iterations,
    residual_sum_of_squares: solution.cost,
  })
}

/// Speed of the point at, or nearest to, [`REFERENCE_DISTANCE`].
///
/// Ties go to the earlier point.
fn reference_speed(points: &[Point]) -> f64 {
  let gap = |p: &Point| (p.x - REFERENCE_DISTANCE).abs();
  points
    .iter()
    .min_by(|l, r| gap(*l).total_cmp(&gap(*r)))
    .map_or(1.0, |p| p.y)
}

// ─── Solver ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Solution {
  params:     Vector3<f64>,
  cost:       f64,
  iterations: usize,
}

fn model(p: &Vector3<f64>, x: f64) -> f64 {
  1.0 / (p[0] * x + p[1]) + p[2]
}

/// Sum of squared residuals; infinite wherever the model is undefined.
fn cost(p: &Vector3<f64>, points: &[Point]) -> f64 {
  let sum: f64 = points
    .iter()
    .map(|pt| {
      let r = pt.y - model(p, pt.x);
      r * r
    })
    .sum();
  if sum.is_finite() { sum } else { f64::INFINITY }
}

/// `(JᵀJ, Jᵀr)` with `J` the Jacobian of the model and `r = y - model`.
fn normal_equations(
  p: &Vector3<f64>,
  points: &[Point],
) -> (Matrix3<f64>, Vector3<f64>) {
  let mut jtj = Matrix3::zeros();
  let mut jtr = Vector3::zeros();
  for pt in points {
    let denominator = p[0] * pt.x + p[1];
    let inv_sq = 1.0 / (denominator * denominator);
    let j = Vector3::new(-pt.x * inv_sq, -inv_sq, 1.0);
    let r = pt.y - (1.0 / denominator + p[2]);
    jtj += j * j.transpose();
    jtr += j * r;
  }
  (jtj, jtr)
}

fn levenberg_marquardt(
  start: Vector3<f64>,
  points: &[Point],
  config: &SolverConfig,
) -> Result<Solution, FitError> {
  let mut params = start;
  let mut current = cost(&params, points);
  if !current.is_finite() {
    return Err(FitError::DidNotConverge { iterations: 0 });
  }
  let mut lambda = LAMBDA_INIT;

  for iteration in 1..=config.max_iterations {
    let done = |params, cost| Solution { params, cost, iterations: iteration };

    let (jtj, jtr) = normal_equations(&params, points);
    if current == 0.0 || jtr.amax() <= config.gtol {
      return Ok(done(params, current));
    }

    loop {
      let mut damped = jtj;
      for i in 0..3 {
        damped[(i, i)] += lambda * jtj[(i, i)];
      }

      if let Some(step) = damped.lu().solve(&jtr) {
        let trial = params + step;
        let trial_cost = cost(&trial, points);
        if trial_cost < current {
          let small_step = step.norm() <= config.xtol * (params.norm() + config.xtol);
          let small_gain = current - trial_cost <= config.ftol * current;
          params = trial;
          current = trial_cost;
          lambda = (lambda / 10.0).max(LAMBDA_MIN);
          if small_step || small_gain || current == 0.0 {
            return Ok(done(params, current));
          }
          break;
        }
      }

      lambda *= 10.0;
      if lambda > LAMBDA_MAX {
        // No step in any direction lowers the cost: a stationary point.
        return Ok(done(params, current));
      }
    }
  }

  Err(FitError::DidNotConverge { iterations: config.max_iterations })
}

/// Linearised initial guess, falling back to `(0, 1, 0)`.
fn linearized_start(points: &[Point]) -> Vector3<f64> {
  let fallback = Vector3::new(0.0, 1.0, 0.0);

  let (lo, hi) = points
    .iter()
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
  let c0 = lo - (hi - lo).max(lo.abs() * 1e-3).max(1e-9);

  let n = points.len();
  let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { points[i].x } else { 1.0 });
  let z = DVector::from_iterator(n, points.iter().map(|p| 1.0 / (p.y - c0)));

  match x.svd(true, true).solve(&z, 1e-12) {
    Ok(ab) if ab.iter().all(|v| v.is_finite()) => Vector3::new(ab[0], ab[1], c0),
    _ => fallback,
  }
}

/// The model through the first, middle and last points by distance.
///
/// Writing the model as `y·(x + s) = p·x + q` makes the three conditions
/// linear in `(s, p, q)`; then `a = 1/K`, `b = s/K`, `c = p` with
/// `K = q − p·s`. Collinear points have no such interpolant.
fn interpolant_start(points: &[Point]) -> Option<Vector3<f64>> {
  let mut order: Vec<&Point> = points.iter().collect();
  order.sort_by(|l, r| l.x.total_cmp(&r.x));
  let picks = [order[0], order[order.len() / 2], order[order.len() - 1]];

  let m = Matrix3::from_fn(|i, j| match j {
    0 => picks[i].y,
    1 => -picks[i].x,
    _ => -1.0,
  });
  let rhs = Vector3::from_fn(|i, _| -picks[i].y * picks[i].x);

  let spq = m.lu().solve(&rhs)?;
  let (s, p, q) = (spq[0], spq[1], spq[2]);
  let k = q - p * s;
  let start = Vector3::new(1.0 / k, s / k, p);
  (k != 0.0 && start.iter().all(|v| v.is_finite())).then_some(start)
}

fn covariance(solution: &Solution, points: &[Point]) -> Option<Matrix3<f64>> {
  let dof = points.len().checked_sub(MIN_POINTS).filter(|d| *d > 0)?;
  let (jtj, _) = normal_equations(&solution.params, points);
  let inverse = jtj.try_inverse()?;
  let scaled = inverse * (solution.cost / dof as f64);
  scaled.iter().all(|v| v.is_finite()).then_some(scaled)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stroke::{PoolLength, Stroke};

  fn points(raw: &[(f64, f64)]) -> Vec<Point> {
    raw.iter().map(|&(x, y)| Point { x, y }).collect()
  }

  fn record(distance: f64, seconds: f64) -> RaceRecord {
    RaceRecord {
      surname: "DOE".into(),
      first_name: "jane".into(),
      pool_length: PoolLength::Short,
      stroke: Stroke::Freestyle,
      distance,
      duration_seconds: seconds,
      speed: distance / seconds,
    }
  }

  fn assert_interpolates(fit: &FitResult, pts: &[Point]) {
    for p in pts {
      let y = fit.predict(p.x).unwrap();
      assert!((y - p.y).abs() < 1e-6, "model({}) = {y}, want {}", p.x, p.y);
    }
  }

  #[test]
  fn three_point_group_fits_and_samples() {
    let records = [record(50.0, 28.3), record(100.0, 60.1), record(200.0, 125.0)];
    let refs: Vec<&RaceRecord> = records.iter().collect();
    let fit = fit_group(&refs, &FitOptions::default()).unwrap();

    assert!(fit.params.a.is_finite() && fit.params.b.is_finite() && fit.params.c.is_finite());
    assert_eq!(fit.predicted.len(), SAMPLE_COUNT);
    assert_eq!(fit.predicted[0].x, 0.0);
    assert_eq!(fit.predicted[SAMPLE_COUNT - 1].x, SAMPLE_MAX_DISTANCE);
    assert_eq!(fit.measured.len(), 3);
    assert_eq!(fit.measured[2], Point { x: 200.0, y: 1.6 });
    assert_interpolates(&fit.params, &fit.measured);
    assert!(fit.params.covariance.is_none());
  }

  #[test]
  fn samples_are_evenly_spaced() {
    let fit = FitResult {
      a: 0.001,
      b: 1.0,
      c: 1.0,
      covariance: None,
      iterations: 0,
      residual_sum_of_squares: 0.0,
    };
    let samples = fit.sample().unwrap();
    let step = SAMPLE_MAX_DISTANCE / (SAMPLE_COUNT - 1) as f64;
    for pair in samples.windows(2) {
      assert!((pair[1].x - pair[0].x - step).abs() < 1e-9);
    }
  }

  #[test]
  fn recovers_known_parameters() {
    let truth = Vector3::new(0.002, 0.6, 1.3);
    let pts: Vec<Point> = [25.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1500.0]
      .iter()
      .map(|&x| Point { x, y: model(&truth, x) })
      .collect();

    let fit = fit_points(&pts, &SolverConfig::default()).unwrap();
    assert!((fit.a - 0.002).abs() < 1e-6, "a = {}", fit.a);
    assert!((fit.b - 0.6).abs() < 1e-4, "b = {}", fit.b);
    assert!((fit.c - 1.3).abs() < 1e-4, "c = {}", fit.c);
  }

  #[test]
  fn three_non_monotone_points_still_fit() {
    let pts = points(&[(100.0, 1.5), (200.0, 1.8), (400.0, 1.6)]);
    let fit = fit_points(&pts, &SolverConfig::default()).unwrap();
    assert!(fit.a.is_finite() && fit.b.is_finite() && fit.c.is_finite());
    assert_interpolates(&fit, &pts);
  }

  #[test]
  fn noisy_group_has_covariance() {
    let pts = points(&[
      (50.0, 1.80),
      (100.0, 1.71),
      (200.0, 1.62),
      (400.0, 1.55),
      (800.0, 1.50),
    ]);
    let fit = fit_points(&pts, &SolverConfig::default()).unwrap();
    assert!(fit.residual_sum_of_squares > 0.0);
    assert!(fit.residual_sum_of_squares < 1e-4);
    let cov = fit.covariance.expect("five points leave two degrees of freedom");
    for i in 0..3 {
      assert!(cov[(i, i)] >= 0.0);
    }
  }

  #[test]
  fn normalization_uses_the_200m_speed() {
    let records = [
      record(50.0, 27.0),
      record(100.0, 58.0),
      record(200.0, 124.0),
      record(400.0, 262.0),
    ];
    let refs: Vec<&RaceRecord> = records.iter().collect();
    let options = FitOptions { normalize_to_200m: true, ..FitOptions::default() };
    let fit = fit_group(&refs, &options).unwrap();

    assert_eq!(fit.measured[2].y, 1.0);
    let reference = 200.0 / 124.0;
    assert!((fit.measured[0].y - (50.0 / 27.0) / reference).abs() < 1e-12);
  }

  #[test]
  fn reference_falls_back_to_nearest_distance() {
    let pts = points(&[(50.0, 2.0), (100.0, 1.8), (400.0, 1.5)]);
    assert_eq!(reference_speed(&pts), 1.8);
  }

  #[test]
  fn reference_ties_go_to_the_earlier_point() {
    let pts = points(&[(250.0, 1.5), (150.0, 1.7), (800.0, 1.4)]);
    assert_eq!(reference_speed(&pts), 1.5);
  }

  #[test]
  fn too_few_points_are_rejected() {
    let records = [record(50.0, 28.0), record(100.0, 60.0)];
    let refs: Vec<&RaceRecord> = records.iter().collect();
    assert_eq!(
      fit_group(&refs, &FitOptions::default()),
      Err(FitError::TooFewPoints(2))
    );
  }

  #[test]
  fn non_finite_input_is_rejected() {
    let pts = points(&[(50.0, 1.8), (100.0, f64::NAN), (200.0, 1.6)]);
    assert_eq!(
      fit_points(&pts, &SolverConfig::default()),
      Err(FitError::NonFinitePoint { index: 1 })
    );
  }

  #[test]
  fn iteration_cap_reports_non_convergence() {
    let pts = points(&[(50.0, 1.8), (100.0, 1.7), (200.0, 1.6), (400.0, 1.55)]);
    let config = SolverConfig { max_iterations: 0, ..SolverConfig::default() };
    assert_eq!(
      fit_points(&pts, &config),
      Err(FitError::DidNotConverge { iterations: 0 })
    );
  }

  #[test]
  fn pole_on_the_sample_grid_is_a_singularity() {
    let fit = FitResult {
      a: 1.0,
      b: 0.0,
      c: 1.0,
      covariance: None,
      iterations: 0,
      residual_sum_of_squares: 0.0,
    };
    assert_eq!(fit.predict(0.0), None);
    assert_eq!(fit.sample(), Err(FitError::Singularity { distance: 0.0 }));
  }

  #[test]
  fn curve_fit_serializes_to_the_wire_shape() {
    let records = [record(50.0, 28.3), record(100.0, 60.1), record(200.0, 125.0)];
    let refs: Vec<&RaceRecord> = records.iter().collect();
    let fit = fit_group(&refs, &FitOptions::default()).unwrap();

    let json = serde_json::to_value(&fit).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 2);
    assert_eq!(obj["pred_values"].as_array().unwrap().len(), SAMPLE_COUNT);
    assert_eq!(obj["mes_values"][0]["x"], 50.0);
  }
}
