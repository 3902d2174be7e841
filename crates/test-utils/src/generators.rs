//! Generators for runtimes, forecast offsets and levels.
//!
//! The deterministic generators produce predictable axes that tests can
//! reason about; the `random_*` ones take a seeded rng so failures
//! reproduce.

use chrono::{DateTime, Duration, Utc};
use coord_common::{parse_runtime, CoordValue, CoordinateKind, Time2D, VertLevel};
use coord_index::{Coordinate, CoordinateBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reference model run used across the test suite (2024-01-15T00:00Z).
pub fn reference_run() -> DateTime<Utc> {
    parse_runtime(REFERENCE_RUN).expect("reference run parses")
}

/// Text form of [`reference_run`].
pub const REFERENCE_RUN: &str = "2024-01-15T00:00:00Z";

/// `count` runtimes starting at `start`, `step_hours` apart.
///
/// # Example
///
/// ```
/// use test_utils::{reference_run, runtimes};
///
/// let runs = runtimes(reference_run(), 4, 6);
/// assert_eq!(runs.len(), 4);
/// assert_eq!((runs[3] - runs[0]).num_hours(), 18);
/// ```
pub fn runtimes(start: DateTime<Utc>, count: usize, step_hours: i64) -> Vec<DateTime<Utc>> {
    (0..count as i64)
        .map(|i| start + Duration::hours(i * step_hours))
        .collect()
}

/// `count` forecast offsets `start, start + step, ...`.
pub fn offsets(start: i32, count: usize, step: i32) -> Vec<i32> {
    (0..count as i32).map(|i| start + i * step).collect()
}

/// `count` isobaric levels descending from 1000 hPa in 50 hPa steps.
pub fn pressure_levels(count: usize) -> Vec<VertLevel> {
    (0..count)
        .map(|i| VertLevel::single(1000.0 - 50.0 * i as f64))
        .collect()
}

/// Every `(run, offset)` pair of the cartesian product.
pub fn time2d_pairs(runs: &[DateTime<Utc>], offsets: &[i32]) -> Vec<Time2D> {
    runs.iter()
        .flat_map(|&run| offsets.iter().map(move |&t| Time2D::new(run, t)))
        .collect()
}

/// Finish a coordinate of `kind` from the given values.
pub fn coordinate(kind: CoordinateKind, values: impl IntoIterator<Item = CoordValue>) -> Coordinate {
    let mut builder = CoordinateBuilder::new(kind);
    for value in values {
        builder.add(value).expect("fixture value matches the coordinate kind");
    }
    builder.finish()
}

pub fn runtime_coordinate(runs: &[DateTime<Utc>]) -> Coordinate {
    coordinate(CoordinateKind::Runtime, runs.iter().copied().map(CoordValue::from))
}

pub fn time_coordinate(offsets: &[i32]) -> Coordinate {
    coordinate(CoordinateKind::Time, offsets.iter().copied().map(CoordValue::from))
}

pub fn vert_coordinate(levels: &[VertLevel]) -> Coordinate {
    coordinate(CoordinateKind::Vert, levels.iter().copied().map(CoordValue::from))
}

/// 2D time coordinate where every run has the same offsets.
pub fn time2d_coordinate(runs: &[DateTime<Utc>], offsets: &[i32]) -> Coordinate {
    coordinate(
        CoordinateKind::Time2D,
        time2d_pairs(runs, offsets).into_iter().map(CoordValue::from),
    )
}

/// Seeded rng for reproducible random fixtures.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` distinct offsets drawn from `0..max`, unsorted.
pub fn random_offsets<R: Rng>(rng: &mut R, count: usize, max: i32) -> Vec<i32> {
    let count = count.min(max.max(0) as usize);
    let mut out: Vec<i32> = Vec::with_capacity(count);
    while out.len() < count {
        let t = rng.gen_range(0..max);
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
