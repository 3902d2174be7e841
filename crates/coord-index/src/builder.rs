//! Accumulates raw axis values into a [`Coordinate`].

use chrono::{DateTime, Utc};
use coord_common::{
    CoordValue, CoordinateKind, EnsMember, IndexError, IndexResult, Time2D, VertLevel,
};

use crate::axis::Axis;
use crate::coordinate::{CoordValues, Coordinate};
use crate::time2d::CoordinateTime2D;

#[derive(Debug, Clone)]
enum Pending {
    Runtime(Vec<DateTime<Utc>>),
    Time(Vec<i32>),
    Vert(Vec<VertLevel>),
    Time2D(Vec<Time2D>),
    Ensemble(Vec<EnsMember>),
}

/// Single-writer accumulator for one axis.
///
/// Values may be added in any order and any number of times; `finish`
/// sorts and dedups them.
///
/// # Example
///
/// ```
/// use coord_common::CoordinateKind;
/// use coord_index::CoordinateBuilder;
///
/// let mut builder = CoordinateBuilder::new(CoordinateKind::Time);
/// for offset in [6, 0, 3, 6] {
///     builder.add(offset.into()).unwrap();
/// }
/// let coord = builder.finish();
/// assert_eq!(coord.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct CoordinateBuilder {
    pending: Pending,
    detect_regular: bool,
}

impl CoordinateBuilder {
    pub fn new(kind: CoordinateKind) -> Self {
        let pending = match kind {
            CoordinateKind::Runtime => Pending::Runtime(Vec::new()),
            CoordinateKind::Time => Pending::Time(Vec::new()),
            CoordinateKind::Vert => Pending::Vert(Vec::new()),
            CoordinateKind::Time2D => Pending::Time2D(Vec::new()),
            CoordinateKind::Ensemble => Pending::Ensemble(Vec::new()),
        };
        Self {
            pending,
            detect_regular: true,
        }
    }

    /// Whether a Time2D builder groups runs by cycle hour when runs differ.
    pub fn with_regular_detection(mut self, detect_regular: bool) -> Self {
        self.detect_regular = detect_regular;
        self
    }

    pub fn kind(&self) -> CoordinateKind {
        match self.pending {
            Pending::Runtime(_) => CoordinateKind::Runtime,
            Pending::Time(_) => CoordinateKind::Time,
            Pending::Vert(_) => CoordinateKind::Vert,
            Pending::Time2D(_) => CoordinateKind::Time2D,
            Pending::Ensemble(_) => CoordinateKind::Ensemble,
        }
    }

    /// Number of values added so far, duplicates included.
    pub fn len(&self) -> usize {
        match &self.pending {
            Pending::Runtime(v) => v.len(),
            Pending::Time(v) => v.len(),
            Pending::Vert(v) => v.len(),
            Pending::Time2D(v) => v.len(),
            Pending::Ensemble(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, value: CoordValue) -> IndexResult<()> {
        let kind = self.kind();
        match (&mut self.pending, value) {
            (Pending::Runtime(v), CoordValue::Runtime(run)) => v.push(run),
            (Pending::Time(v), CoordValue::Time(offset)) => v.push(offset),
            (Pending::Vert(v), CoordValue::Vert(level)) => v.push(level),
            (Pending::Time2D(v), CoordValue::Time2D(t)) => v.push(t),
            (Pending::Ensemble(v), CoordValue::Ensemble(ens)) => v.push(ens),
            (_, value) => return Err(IndexError::kind_mismatch(kind, value.kind())),
        }
        Ok(())
    }

    /// Merge every value of a finished coordinate of the same kind.
    pub fn add_all(&mut self, coord: &Coordinate) -> IndexResult<()> {
        let kind = self.kind();
        match (&mut self.pending, coord.values()) {
            (Pending::Runtime(v), CoordValues::Runtime(src)) => v.extend_from_slice(src),
            (Pending::Time(v), CoordValues::Time(src)) => v.extend_from_slice(src),
            (Pending::Vert(v), CoordValues::Vert(src)) => v.extend_from_slice(src),
            (Pending::Time2D(v), CoordValues::Time2D(src)) => v.extend_from_slice(src),
            (Pending::Ensemble(v), CoordValues::Ensemble(src)) => v.extend_from_slice(src),
            _ => return Err(IndexError::kind_mismatch(kind, coord.kind())),
        }
        Ok(())
    }

    /// Sort, dedup and freeze. Zero adds give a size-0 coordinate.
    pub fn finish(self) -> Coordinate {
        match self.pending {
            Pending::Runtime(v) => Coordinate::Runtime(Axis::from_unsorted(v)),
            Pending::Time(v) => Coordinate::Time(Axis::from_unsorted(v)),
            Pending::Vert(v) => Coordinate::Vert(Axis::from_unsorted(v)),
            Pending::Time2D(v) => {
                let values = Axis::from_unsorted(v).into_vec();
                Coordinate::Time2D(CoordinateTime2D::from_sorted_values(
                    values,
                    self.detect_regular,
                ))
            }
            Pending::Ensemble(v) => Coordinate::Ensemble(Axis::from_unsorted(v)),
        }
    }
}
