//! Sparse storage for a mostly-empty multidimensional grid of records.
//!
//! `track` has one slot per cell of the flattened grid: 0 means empty,
//! `k > 0` means the cell's record is `content[k - 1]`. Content is kept in
//! ascending flat-index order. Flattening is row-major: the last axis
//! varies fastest.

use coord_common::{IndexError, IndexResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Immutable sparse array of records.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    track: Vec<u32>,
    content: Vec<T>,
    ndups: usize,
}

fn total_size(shape: &[usize]) -> IndexResult<usize> {
    shape.iter().try_fold(1usize, |acc, &n| {
        acc.checked_mul(n).ok_or_else(|| {
            IndexError::configuration(format!("shape {:?} overflows the flat index", shape))
        })
    })
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

fn flatten(shape: &[usize], strides: &[usize], indices: &[usize]) -> IndexResult<usize> {
    if indices.len() != shape.len() {
        return Err(IndexError::configuration(format!(
            "expected {} indices, got {}",
            shape.len(),
            indices.len()
        )));
    }
    let mut flat = 0;
    let dims = shape.iter().zip(strides);
    for (axis, (&idx, (&size, &stride))) in indices.iter().zip(dims).enumerate() {
        if idx >= size {
            return Err(IndexError::out_of_bounds(axis, idx, size));
        }
        flat += idx * stride;
    }
    Ok(flat)
}

impl<T> SparseArray<T> {
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn total_size(&self) -> usize {
        self.track.len()
    }

    /// Number of occupied cells.
    pub fn count(&self) -> usize {
        self.content.len()
    }

    /// Writes that replaced an already occupied cell while building.
    pub fn ndups(&self) -> usize {
        self.ndups
    }

    /// Fraction of occupied cells; 0 for a zero-size grid.
    pub fn density(&self) -> f64 {
        if self.track.is_empty() {
            0.0
        } else {
            self.content.len() as f64 / self.track.len() as f64
        }
    }

    pub fn flat_index(&self, indices: &[usize]) -> IndexResult<usize> {
        flatten(&self.shape, &self.strides, indices)
    }

    /// Inverse of [`flat_index`](Self::flat_index).
    pub fn unflatten(&self, mut flat: usize) -> Vec<usize> {
        self.strides
            .iter()
            .map(|&stride| {
                let idx = flat.checked_div(stride).unwrap_or(0);
                flat = flat.checked_rem(stride).unwrap_or(0);
                idx
            })
            .collect()
    }

    /// Record at `indices`, `Ok(None)` for an empty cell.
    pub fn get(&self, indices: &[usize]) -> IndexResult<Option<&T>> {
        let flat = self.flat_index(indices)?;
        Ok(self.get_flat(flat))
    }

    pub fn get_flat(&self, flat: usize) -> Option<&T> {
        match self.track.get(flat) {
            Some(&k) if k > 0 => self.content.get(k as usize - 1),
            _ => None,
        }
    }

    pub fn track(&self) -> &[u32] {
        &self.track
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Occupied cells as `(flat_index, record)`, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.track
            .iter()
            .enumerate()
            .filter(|&(_, &k)| k > 0)
            .filter_map(move |(flat, &k)| self.content.get(k as usize - 1).map(|rec| (flat, rec)))
    }
}

/// Builds a [`SparseArray`] for a fixed shape.
///
/// # Example
///
/// ```
/// use coord_index::SparseArrayBuilder;
///
/// let mut builder = SparseArrayBuilder::new(vec![2, 3]).unwrap();
/// builder.set(&[1, 2], "b").unwrap();
/// builder.set(&[0, 1], "a").unwrap();
/// let sa = builder.finish().unwrap();
///
/// assert_eq!(sa.content(), &["a", "b"]);
/// assert_eq!(sa.get(&[1, 2]).unwrap(), Some(&"b"));
/// assert_eq!(sa.get(&[1, 1]).unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct SparseArrayBuilder<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    track: Vec<u32>,
    content: Vec<T>,
    ndups: usize,
}

impl<T> SparseArrayBuilder<T> {
    pub fn new(shape: Vec<usize>) -> IndexResult<Self> {
        let total = total_size(&shape)?;
        let strides = row_major_strides(&shape);
        Ok(Self {
            shape,
            strides,
            track: vec![0; total],
            content: Vec::new(),
            ndups: 0,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn total_size(&self) -> usize {
        self.track.len()
    }

    /// Place a record; a later write to the same cell wins.
    pub fn set(&mut self, indices: &[usize], value: T) -> IndexResult<()> {
        let flat = flatten(&self.shape, &self.strides, indices)?;
        self.set_flat(flat, value)
    }

    pub fn set_flat(&mut self, flat: usize, value: T) -> IndexResult<()> {
        let size = self.track.len();
        let slot = self
            .track
            .get_mut(flat)
            .ok_or_else(|| IndexError::out_of_bounds(0, flat, size))?;
        if *slot != 0 {
            self.ndups += 1;
        }
        self.content.push(value);
        *slot = u32::try_from(self.content.len()).map_err(|_| {
            IndexError::configuration("sparse array content exceeds u32 positions")
        })?;
        Ok(())
    }

    /// Reorder content into flat-index order, dropping replaced records.
    pub fn finish(self) -> IndexResult<SparseArray<T>> {
        let mut pending: Vec<Option<T>> = self.content.into_iter().map(Some).collect();
        let mut track = self.track;
        let mut content = Vec::with_capacity(pending.len() - self.ndups);

        for slot in track.iter_mut().filter(|k| **k > 0) {
            let record = pending
                .get_mut(*slot as usize - 1)
                .and_then(Option::take)
                .ok_or_else(|| IndexError::invariant("sparse track points at a consumed record"))?;
            content.push(record);
            *slot = content.len() as u32;
        }

        let sa = SparseArray {
            shape: self.shape,
            strides: self.strides,
            track,
            content,
            ndups: self.ndups,
        };
        check_track(&sa.track, sa.content.len())?;
        Ok(sa)
    }

    /// Rebuild from persisted parts.
    ///
    /// `track.len()` must equal the product of `shape`, its nonzero entries
    /// must number `content.len()` and read `1, 2, .., n` in flat order.
    pub fn from_parts(shape: Vec<usize>, track: Vec<u32>, content: Vec<T>) -> IndexResult<SparseArray<T>> {
        let total = total_size(&shape)?;
        if track.len() != total {
            return Err(IndexError::configuration(format!(
                "track length {} does not match shape {:?} (total {})",
                track.len(),
                shape,
                total
            )));
        }
        check_track(&track, content.len())?;

        let strides = row_major_strides(&shape);
        Ok(SparseArray {
            shape,
            strides,
            track,
            content,
            ndups: 0,
        })
    }
}

fn check_track(track: &[u32], content_len: usize) -> IndexResult<()> {
    let mut expected = 1u32;
    for (flat, &k) in track.iter().enumerate().filter(|&(_, &k)| k > 0) {
        if k != expected {
            return Err(IndexError::configuration(format!(
                "track[{}] = {}, expected {}",
                flat, k, expected
            )));
        }
        expected += 1;
    }
    let occupied = (expected - 1) as usize;
    if occupied != content_len {
        return Err(IndexError::configuration(format!(
            "track has {} occupied cells but content has {} records",
            occupied, content_len
        )));
    }
    Ok(())
}

#[derive(Serialize)]
struct SparseArrayRef<'a, T> {
    shape: &'a [usize],
    track: &'a [u32],
    content: &'a [T],
    ndups: usize,
}

#[derive(Deserialize)]
struct SparseArrayParts<T> {
    shape: Vec<usize>,
    track: Vec<u32>,
    content: Vec<T>,
    #[serde(default)]
    ndups: usize,
}

impl<T: Serialize> Serialize for SparseArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SparseArrayRef {
            shape: &self.shape,
            track: &self.track,
            content: &self.content,
            ndups: self.ndups,
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SparseArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = SparseArrayParts::<T>::deserialize(deserializer)?;
        let mut sa = SparseArrayBuilder::from_parts(parts.shape, parts.track, parts.content)
            .map_err(serde::de::Error::custom)?;
        sa.ndups = parts.ndups;
        Ok(sa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_flatten() {
        let sa = SparseArrayBuilder::<u32>::new(vec![3, 4, 5]).unwrap().finish().unwrap();
        assert_eq!(sa.flat_index(&[0, 0, 1]).unwrap(), 1);
        assert_eq!(sa.flat_index(&[0, 1, 0]).unwrap(), 5);
        assert_eq!(sa.flat_index(&[1, 0, 0]).unwrap(), 20);
        assert_eq!(sa.flat_index(&[2, 3, 4]).unwrap(), 59);

        for flat in 0..sa.total_size() {
            let idx = sa.unflatten(flat);
            assert_eq!(sa.flat_index(&idx).unwrap(), flat);
        }
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut builder = SparseArrayBuilder::new(vec![2, 2]).unwrap();
        builder.set(&[1, 1], 'x').unwrap();
        assert!(matches!(
            builder.set(&[2, 0], 'y'),
            Err(IndexError::OutOfBounds { axis: 0, index: 2, size: 2 })
        ));
        let sa = builder.finish().unwrap();
        assert!(matches!(
            sa.get(&[0, 5]),
            Err(IndexError::OutOfBounds { axis: 1, index: 5, size: 2 })
        ));
        assert!(matches!(sa.get(&[0]), Err(IndexError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_set_keeps_last() {
        let mut builder = SparseArrayBuilder::new(vec![4]).unwrap();
        builder.set(&[2], "first").unwrap();
        builder.set(&[0], "zero").unwrap();
        builder.set(&[2], "second").unwrap();
        let sa = builder.finish().unwrap();

        assert_eq!(sa.ndups(), 1);
        assert_eq!(sa.count(), 2);
        assert_eq!(sa.track(), &[1, 0, 2, 0]);
        assert_eq!(sa.get(&[2]).unwrap(), Some(&"second"));
    }

    #[test]
    fn test_from_parts_validates() {
        let ok = SparseArrayBuilder::from_parts(vec![2, 2], vec![1, 0, 0, 2], vec!['a', 'b']);
        assert!(ok.is_ok());

        let short_content = SparseArrayBuilder::from_parts(vec![2, 2], vec![1, 0, 0, 2], vec!['a']);
        assert!(matches!(short_content, Err(IndexError::Configuration(_))));

        let bad_length = SparseArrayBuilder::from_parts(vec![2, 2], vec![1, 0, 2], vec!['a', 'b']);
        assert!(matches!(bad_length, Err(IndexError::Configuration(_))));

        let out_of_order = SparseArrayBuilder::from_parts(vec![2, 2], vec![2, 0, 0, 1], vec!['a', 'b']);
        assert!(matches!(out_of_order, Err(IndexError::Configuration(_))));
    }

    #[test]
    fn test_zero_size_grid() {
        let sa = SparseArrayBuilder::<u8>::new(vec![3, 0]).unwrap().finish().unwrap();
        assert_eq!(sa.total_size(), 0);
        assert_eq!(sa.density(), 0.0);
        assert!(sa.get(&[0, 0]).is_err());
    }

    #[test]
    fn test_shape_overflow() {
        let result = SparseArrayBuilder::<u8>::new(vec![usize::MAX, 2]);
        assert!(matches!(result, Err(IndexError::Configuration(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let mut builder = SparseArrayBuilder::new(vec![2, 3]).unwrap();
        builder.set(&[0, 2], 7u64).unwrap();
        builder.set(&[1, 0], 9u64).unwrap();
        let sa = builder.finish().unwrap();

        let json = serde_json::to_string(&sa).unwrap();
        let back: SparseArray<u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sa);

        let corrupt = r#"{"shape":[2,3],"track":[0,0,1,2,0,0],"content":[7]}"#;
        assert!(serde_json::from_str::<SparseArray<u64>>(corrupt).is_err());
    }
}
