//! Unions 2D time coordinates from many sources into one.

use chrono::{DateTime, Utc};
use coord_common::{CoordinateKind, IndexError, IndexResult};
use std::collections::BTreeMap;
use std::mem;

use crate::axis::Axis;
use crate::coordinate::Coordinate;
use crate::time2d::CoordinateTime2D;

#[derive(Debug, Clone)]
enum State {
    Empty,
    Accumulating(BTreeMap<DateTime<Utc>, Vec<i32>>),
    Finished(CoordinateTime2D),
}

/// Accumulates `(run, offset)` pairs run by run and classifies the union.
///
/// Calls must follow `add_all`+ then `finish`; anything else is an
/// [`IndexError::IllegalState`].
#[derive(Debug, Clone)]
pub struct CoordinateTime2DUnionizer {
    state: State,
    detect_regular: bool,
}

impl Default for CoordinateTime2DUnionizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateTime2DUnionizer {
    pub fn new() -> Self {
        Self {
            state: State::Empty,
            detect_regular: true,
        }
    }

    pub fn with_regular_detection(mut self, detect_regular: bool) -> Self {
        self.detect_regular = detect_regular;
        self
    }

    /// Merge every run of `source` and that run's offsets.
    pub fn add_all(&mut self, source: &CoordinateTime2D) -> IndexResult<()> {
        if matches!(self.state, State::Empty) {
            self.state = State::Accumulating(BTreeMap::new());
        }
        let State::Accumulating(runs) = &mut self.state else {
            return Err(IndexError::illegal_state(
                "time2D unionizer: add_all after finish",
            ));
        };

        for t in source.values() {
            runs.entry(t.run).or_default().push(t.time);
        }
        Ok(())
    }

    /// Like [`add_all`](Self::add_all) for a generic coordinate, which must
    /// be a Time2D one.
    pub fn add_coordinate(&mut self, coord: &Coordinate) -> IndexResult<()> {
        match coord.as_time2d() {
            Some(time2d) => self.add_all(time2d),
            None => Err(IndexError::kind_mismatch(CoordinateKind::Time2D, coord.kind())),
        }
    }

    /// Freeze the union and classify it.
    pub fn finish(&mut self) -> IndexResult<&CoordinateTime2D> {
        let runs = match mem::replace(&mut self.state, State::Empty) {
            State::Accumulating(runs) => runs,
            State::Empty => {
                return Err(IndexError::illegal_state(
                    "time2D unionizer: finish with nothing added",
                ))
            }
            finished @ State::Finished(_) => {
                self.state = finished;
                return Err(IndexError::illegal_state("time2D unionizer: finish called twice"));
            }
        };

        let mut runtimes = Vec::with_capacity(runs.len());
        let mut times = Vec::with_capacity(runs.len());
        for (run, offsets) in runs {
            runtimes.push(run);
            times.push(Axis::from_unsorted(offsets));
        }
        let coord = CoordinateTime2D::assemble(
            Axis::from_sorted_unchecked(runtimes),
            times,
            self.detect_regular,
        );

        tracing::debug!(
            nruns = coord.nruns(),
            ntimes = coord.ntimes(),
            pairs = coord.len(),
            orthogonal = coord.is_orthogonal(),
            regular = coord.is_regular(),
            "time2D union finished"
        );

        self.state = State::Finished(coord);
        self.coordinate()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished(_))
    }

    pub fn coordinate(&self) -> IndexResult<&CoordinateTime2D> {
        match &self.state {
            State::Finished(coord) => Ok(coord),
            _ => Err(IndexError::illegal_state(
                "time2D unionizer: coordinate requested before finish",
            )),
        }
    }

    pub fn into_coordinate(self) -> IndexResult<CoordinateTime2D> {
        match self.state {
            State::Finished(coord) => Ok(coord),
            _ => Err(IndexError::illegal_state(
                "time2D unionizer: coordinate requested before finish",
            )),
        }
    }
}
