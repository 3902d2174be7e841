//! Sorted, deduplicated value storage shared by every coordinate kind.

use coord_common::{IndexError, IndexResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Strictly ascending sequence of distinct values.
///
/// Position `i` maps to `values[i]` for the lifetime of the axis, and
/// `index_of` is a binary search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Axis<V> {
    values: Vec<V>,
}

impl<V> Default for Axis<V> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<V: Ord> Axis<V> {
    /// Sort and dedup raw values.
    pub fn from_unsorted(mut values: Vec<V>) -> Self {
        values.sort();
        values.dedup();
        Self { values }
    }

    /// Wrap values that must already be strictly ascending.
    ///
    /// This is the reconstruction path for persisted axes.
    pub fn from_sorted(values: Vec<V>) -> IndexResult<Self> {
        if let Some(pos) = values.windows(2).position(|w| w[0] >= w[1]) {
            return Err(IndexError::configuration(format!(
                "axis values not strictly ascending at position {}",
                pos + 1
            )));
        }
        Ok(Self { values })
    }

    /// Wrap values the caller has already sorted and deduplicated.
    pub(crate) fn from_sorted_unchecked(values: Vec<V>) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        Self { values }
    }

    pub fn index_of(&self, value: &V) -> Option<usize> {
        self.values.binary_search(value).ok()
    }

    /// Whether every value of `other` is on this axis.
    pub fn contains_all(&self, other: &Axis<V>) -> bool {
        other.values.iter().all(|v| self.index_of(v).is_some())
    }
}

impl<V> Axis<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&V> {
        self.values.get(idx)
    }

    pub fn first(&self) -> Option<&V> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&V> {
        self.values.last()
    }

    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<V> {
        self.values
    }
}

impl<V: Serialize> Serialize for Axis<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de> + Ord> Deserialize<'de> for Axis<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<V>::deserialize(deserializer)?;
        Axis::from_sorted(values).map_err(serde::de::Error::custom)
    }
}
