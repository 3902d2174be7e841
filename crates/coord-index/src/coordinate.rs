//! Immutable coordinate axes.
//!
//! A [`Coordinate`] is one ordered axis of distinct values of a single kind.
//! The variants share the same contract: `size`, `value_at`, `index_of`,
//! `values`, `kind`. Each variant compares values by its own rule (exact
//! instants, exact integers, exact level pairs, lexicographic pairs).

use chrono::{DateTime, Utc};
use coord_common::{
    CoordValue, CoordinateKind, EnsMember, IndexError, IndexResult, Time2D, VertLevel,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::axis::Axis;
use crate::time2d::CoordinateTime2D;

/// One ordered, deduplicated axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum Coordinate {
    Runtime(Axis<DateTime<Utc>>),
    Time(Axis<i32>),
    Vert(Axis<VertLevel>),
    Time2D(CoordinateTime2D),
    Ensemble(Axis<EnsMember>),
}

/// Read-only typed view of a coordinate's values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordValues<'a> {
    Runtime(&'a [DateTime<Utc>]),
    Time(&'a [i32]),
    Vert(&'a [VertLevel]),
    Time2D(&'a [Time2D]),
    Ensemble(&'a [EnsMember]),
}

impl CoordValues<'_> {
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Runtime(v) => v.len(),
            CoordValues::Time(v) => v.len(),
            CoordValues::Vert(v) => v.len(),
            CoordValues::Time2D(v) => v.len(),
            CoordValues::Ensemble(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Coordinate {
    /// A size-0 coordinate of the given kind.
    ///
    /// An empty Time2D has no runs, so regular detection has nothing to act on.
    pub fn empty(kind: CoordinateKind) -> Self {
        match kind {
            CoordinateKind::Runtime => Coordinate::Runtime(Axis::default()),
            CoordinateKind::Time => Coordinate::Time(Axis::default()),
            CoordinateKind::Vert => Coordinate::Vert(Axis::default()),
            CoordinateKind::Time2D => {
                Coordinate::Time2D(CoordinateTime2D::from_sorted_values(Vec::new(), true))
            }
            CoordinateKind::Ensemble => Coordinate::Ensemble(Axis::default()),
        }
    }

    /// Rebuild a coordinate from a previously emitted value sequence.
    ///
    /// Values must all be of `kind` and strictly ascending. Time2D values are
    /// classified with regular detection on, matching `IndexConfig::default()`;
    /// use [`Coordinate::from_sorted_with_detection`] to follow a config.
    pub fn from_sorted(kind: CoordinateKind, values: Vec<CoordValue>) -> IndexResult<Self> {
        Self::from_sorted_with_detection(kind, values, true)
    }

    /// Like [`Coordinate::from_sorted`], with regular detection for Time2D
    /// values set by `detect_regular`. Other kinds ignore the flag.
    pub fn from_sorted_with_detection(
        kind: CoordinateKind,
        values: Vec<CoordValue>,
        detect_regular: bool,
    ) -> IndexResult<Self> {
        if let Some(bad) = values.iter().find(|v| v.kind() != kind) {
            return Err(IndexError::kind_mismatch(kind, bad.kind()));
        }

        let coord = match kind {
            CoordinateKind::Runtime => Coordinate::Runtime(Axis::from_sorted(
                values.iter().filter_map(as_runtime).collect(),
            )?),
            CoordinateKind::Time => Coordinate::Time(Axis::from_sorted(
                values.iter().filter_map(as_time).collect(),
            )?),
            CoordinateKind::Vert => Coordinate::Vert(Axis::from_sorted(
                values.iter().filter_map(as_vert).collect(),
            )?),
            CoordinateKind::Time2D => Coordinate::Time2D(CoordinateTime2D::from_values(
                values.iter().filter_map(as_time2d).collect(),
                detect_regular,
            )?),
            CoordinateKind::Ensemble => Coordinate::Ensemble(Axis::from_sorted(
                values.iter().filter_map(as_ens).collect(),
            )?),
        };
        Ok(coord)
    }

    pub fn kind(&self) -> CoordinateKind {
        match self {
            Coordinate::Runtime(_) => CoordinateKind::Runtime,
            Coordinate::Time(_) => CoordinateKind::Time,
            Coordinate::Vert(_) => CoordinateKind::Vert,
            Coordinate::Time2D(_) => CoordinateKind::Time2D,
            Coordinate::Ensemble(_) => CoordinateKind::Ensemble,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Coordinate::Runtime(axis) => axis.len(),
            Coordinate::Time(axis) => axis.len(),
            Coordinate::Vert(axis) => axis.len(),
            Coordinate::Time2D(coord) => coord.len(),
            Coordinate::Ensemble(axis) => axis.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Value at `idx`, or `None` past the end.
    pub fn get(&self, idx: usize) -> Option<CoordValue> {
        match self {
            Coordinate::Runtime(axis) => axis.get(idx).copied().map(CoordValue::Runtime),
            Coordinate::Time(axis) => axis.get(idx).copied().map(CoordValue::Time),
            Coordinate::Vert(axis) => axis.get(idx).copied().map(CoordValue::Vert),
            Coordinate::Time2D(coord) => coord.values().get(idx).copied().map(CoordValue::Time2D),
            Coordinate::Ensemble(axis) => axis.get(idx).copied().map(CoordValue::Ensemble),
        }
    }

    /// Value at `idx`; past the end is a bounds error.
    pub fn value_at(&self, idx: usize) -> IndexResult<CoordValue> {
        self.get(idx)
            .ok_or_else(|| IndexError::out_of_bounds(0, idx, self.size()))
    }

    /// Position of `value`, or `None` when it is absent or of another kind.
    pub fn index_of(&self, value: &CoordValue) -> Option<usize> {
        match (self, value) {
            (Coordinate::Runtime(axis), CoordValue::Runtime(v)) => axis.index_of(v),
            (Coordinate::Time(axis), CoordValue::Time(v)) => axis.index_of(v),
            (Coordinate::Vert(axis), CoordValue::Vert(v)) => axis.index_of(v),
            (Coordinate::Time2D(coord), CoordValue::Time2D(v)) => coord.index_of(v),
            (Coordinate::Ensemble(axis), CoordValue::Ensemble(v)) => axis.index_of(v),
            _ => None,
        }
    }

    pub fn values(&self) -> CoordValues<'_> {
        match self {
            Coordinate::Runtime(axis) => CoordValues::Runtime(axis.as_slice()),
            Coordinate::Time(axis) => CoordValues::Time(axis.as_slice()),
            Coordinate::Vert(axis) => CoordValues::Vert(axis.as_slice()),
            Coordinate::Time2D(coord) => CoordValues::Time2D(coord.values()),
            Coordinate::Ensemble(axis) => CoordValues::Ensemble(axis.as_slice()),
        }
    }

    /// Values as tagged [`CoordValue`]s, in axis order.
    pub fn iter(&self) -> impl Iterator<Item = CoordValue> + '_ {
        (0..self.size()).filter_map(move |idx| self.get(idx))
    }

    pub fn as_time2d(&self) -> Option<&CoordinateTime2D> {
        match self {
            Coordinate::Time2D(coord) => Some(coord),
            _ => None,
        }
    }

    pub fn as_runtime(&self) -> Option<&Axis<DateTime<Utc>>> {
        match self {
            Coordinate::Runtime(axis) => Some(axis),
            _ => None,
        }
    }

    /// Same kind, and every value of `other` is on this coordinate.
    pub fn is_superset_of(&self, other: &Coordinate) -> bool {
        match (self, other) {
            (Coordinate::Runtime(a), Coordinate::Runtime(b)) => a.contains_all(b),
            (Coordinate::Time(a), Coordinate::Time(b)) => a.contains_all(b),
            (Coordinate::Vert(a), Coordinate::Vert(b)) => a.contains_all(b),
            (Coordinate::Time2D(a), Coordinate::Time2D(b)) => {
                b.values().iter().all(|v| a.index_of(v).is_some())
            }
            (Coordinate::Ensemble(a), Coordinate::Ensemble(b)) => a.contains_all(b),
            _ => false,
        }
    }
}

fn as_runtime(v: &CoordValue) -> Option<DateTime<Utc>> {
    match v {
        CoordValue::Runtime(r) => Some(*r),
        _ => None,
    }
}

fn as_time(v: &CoordValue) -> Option<i32> {
    match v {
        CoordValue::Time(t) => Some(*t),
        _ => None,
    }
}

fn as_vert(v: &CoordValue) -> Option<VertLevel> {
    match v {
        CoordValue::Vert(level) => Some(*level),
        _ => None,
    }
}

fn as_time2d(v: &CoordValue) -> Option<Time2D> {
    match v {
        CoordValue::Time2D(t) => Some(*t),
        _ => None,
    }
}

fn as_ens(v: &CoordValue) -> Option<EnsMember> {
    match v {
        CoordValue::Ensemble(e) => Some(*e),
        _ => None,
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Coordinate::Time2D(coord) = self {
            return write!(f, "{} size={}", coord, coord.len());
        }
        write!(f, "{} size={}", self.kind(), self.size())?;
        if let (Some(first), Some(last)) = (self.get(0), self.size().checked_sub(1).and_then(|i| self.get(i))) {
            write!(f, " [{} .. {}]", first, last)?;
        }
        Ok(())
    }
}
