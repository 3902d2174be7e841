//! Vertical level and ensemble member values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A vertical level: a single value, or a `[low, high]` layer.
///
/// Equality and ordering are exact: two levels match only when both bounds
/// are equal as IEEE-754 values, with ordering by `f64::total_cmp`. Negative
/// zero is folded into positive zero on construction and deserialization.
/// Levels that differ only by unit conversion noise stay distinct.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "RawVertLevel")]
pub struct VertLevel {
    pub low: f64,
    pub high: f64,
}

#[derive(Deserialize)]
struct RawVertLevel {
    low: f64,
    high: f64,
}

impl From<RawVertLevel> for VertLevel {
    fn from(raw: RawVertLevel) -> Self {
        VertLevel::layer(raw.low, raw.high)
    }
}

// -0.0 + 0.0 == +0.0
fn fold_zero(value: f64) -> f64 {
    value + 0.0
}

impl VertLevel {
    /// A single level (`low == high`).
    pub fn single(value: f64) -> Self {
        let value = fold_zero(value);
        Self {
            low: value,
            high: value,
        }
    }

    /// A layer between two bounds.
    pub fn layer(low: f64, high: f64) -> Self {
        Self {
            low: fold_zero(low),
            high: fold_zero(high),
        }
    }

    pub fn is_layer(&self) -> bool {
        fold_zero(self.low).total_cmp(&fold_zero(self.high)) != Ordering::Equal
    }

    /// Midpoint of the layer, or the level itself.
    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

impl PartialEq for VertLevel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VertLevel {}

// Bit patterns of the zero-folded bounds, consistent with `cmp`.
impl Hash for VertLevel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fold_zero(self.low).to_bits().hash(state);
        fold_zero(self.high).to_bits().hash(state);
    }
}

// Folded again here so struct literals with -0.0 still match.
impl Ord for VertLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fold_zero(self.low)
            .total_cmp(&fold_zero(other.low))
            .then_with(|| fold_zero(self.high).total_cmp(&fold_zero(other.high)))
    }
}

impl PartialOrd for VertLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_layer() {
            write!(f, "({},{})", self.low, self.high)
        } else {
            write!(f, "{}", self.low)
        }
    }
}

/// An ensemble member, identified by its product code and member number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnsMember {
    pub code: u16,
    pub number: i32,
}

impl EnsMember {
    pub fn new(code: u16, number: i32) -> Self {
        Self { code, number }
    }
}

impl fmt::Display for EnsMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.number)
    }
}
