//! Error types for coordinate indexing.

use thiserror::Error;

use crate::CoordinateKind;

/// Result type alias using IndexError.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while building or querying a coordinate index.
///
/// A value that is simply absent from an axis is not an error: lookups
/// return `None` for that case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    // === Build-time Errors ===
    /// Malformed builder or sparse array input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value of one axis kind was handed to an axis of another kind.
    #[error("coordinate kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: CoordinateKind,
        found: CoordinateKind,
    },

    // === Query Errors ===
    /// An index was outside the extent of its axis.
    #[error("index {index} out of bounds for axis {axis} of size {size}")]
    OutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },

    // === Programmer Errors ===
    /// A builder was driven out of its state-machine order.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// An internal guarantee did not hold, e.g. a canonical axis missing a
    /// value it was built from.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl IndexError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an OutOfBounds error.
    pub fn out_of_bounds(axis: usize, index: usize, size: usize) -> Self {
        Self::OutOfBounds { axis, index, size }
    }

    /// Create a KindMismatch error.
    pub fn kind_mismatch(expected: CoordinateKind, found: CoordinateKind) -> Self {
        Self::KindMismatch { expected, found }
    }

    /// Create an IllegalState error.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// Create an InvariantViolation error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Whether the error should abort the current index rebuild.
    ///
    /// Bounds errors come from a bad query and leave built structures usable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, IndexError::OutOfBounds { .. })
    }
}
