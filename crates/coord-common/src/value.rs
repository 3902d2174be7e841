//! Axis kinds and the tagged value carried by each kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::level::{EnsMember, VertLevel};
use crate::time::Time2D;

/// Semantic kind of a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoordinateKind {
    /// Model run times
    Runtime,
    /// Forecast offsets from a single runtime
    Time,
    /// Vertical levels
    Vert,
    /// (run, offset) pairs
    Time2D,
    /// Ensemble members
    Ensemble,
}

impl CoordinateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateKind::Runtime => "runtime",
            CoordinateKind::Time => "time",
            CoordinateKind::Vert => "vert",
            CoordinateKind::Time2D => "time2D",
            CoordinateKind::Ensemble => "ens",
        }
    }
}

impl fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value on an axis, tagged with its kind.
///
/// Values of the same kind order like their axis; across kinds the order
/// follows [`CoordinateKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoordValue {
    Runtime(DateTime<Utc>),
    Time(i32),
    Vert(VertLevel),
    Time2D(Time2D),
    Ensemble(EnsMember),
}

impl CoordValue {
    pub fn kind(&self) -> CoordinateKind {
        match self {
            CoordValue::Runtime(_) => CoordinateKind::Runtime,
            CoordValue::Time(_) => CoordinateKind::Time,
            CoordValue::Vert(_) => CoordinateKind::Vert,
            CoordValue::Time2D(_) => CoordinateKind::Time2D,
            CoordValue::Ensemble(_) => CoordinateKind::Ensemble,
        }
    }
}

impl fmt::Display for CoordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordValue::Runtime(run) => write!(f, "{}", run.format("%Y-%m-%dT%H:%MZ")),
            CoordValue::Time(offset) => write!(f, "{}", offset),
            CoordValue::Vert(level) => write!(f, "{}", level),
            CoordValue::Time2D(t) => write!(f, "{}", t),
            CoordValue::Ensemble(ens) => write!(f, "{}", ens),
        }
    }
}

impl From<DateTime<Utc>> for CoordValue {
    fn from(run: DateTime<Utc>) -> Self {
        CoordValue::Runtime(run)
    }
}

impl From<i32> for CoordValue {
    fn from(offset: i32) -> Self {
        CoordValue::Time(offset)
    }
}

impl From<VertLevel> for CoordValue {
    fn from(level: VertLevel) -> Self {
        CoordValue::Vert(level)
    }
}

impl From<Time2D> for CoordValue {
    fn from(t: Time2D) -> Self {
        CoordValue::Time2D(t)
    }
}

impl From<EnsMember> for CoordValue {
    fn from(ens: EnsMember) -> Self {
        CoordValue::Ensemble(ens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_kind() {
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(CoordValue::from(run).kind(), CoordinateKind::Runtime);
        assert_eq!(CoordValue::from(6).kind(), CoordinateKind::Time);
        assert_eq!(
            CoordValue::from(VertLevel::single(850.0)).kind(),
            CoordinateKind::Vert
        );
        assert_eq!(
            CoordValue::from(Time2D::new(run, 3)).kind(),
            CoordinateKind::Time2D
        );
        assert_eq!(
            CoordValue::from(EnsMember::new(4, 1)).kind(),
            CoordinateKind::Ensemble
        );
    }

    #[test]
    fn test_value_json() {
        let value = CoordValue::Vert(VertLevel::layer(0.0, 10.0));
        let json = serde_json::to_string(&value).unwrap();
        let back: CoordValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
