//! Occupancy counting for diagnostic dumps.

/// Number of occupied cells per index of each axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    counts: Vec<Vec<usize>>,
    total: usize,
}

impl Occupancy {
    pub fn new(shape: &[usize]) -> Self {
        Self {
            counts: shape.iter().map(|&n| vec![0; n]).collect(),
            total: 0,
        }
    }

    /// Count one occupied cell at `indices`. Indices beyond the shape
    /// this was created with are ignored.
    pub fn add(&mut self, indices: &[usize]) {
        for (axis_counts, &idx) in self.counts.iter_mut().zip(indices) {
            if let Some(count) = axis_counts.get_mut(idx) {
                *count += 1;
            }
        }
        self.total += 1;
    }

    /// Counts for one axis, indexed like the axis.
    pub fn counts(&self, axis: usize) -> &[usize] {
        self.counts.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Indices of `axis` with no data at all.
    pub fn empty_indices(&self, axis: usize) -> Vec<usize> {
        self.counts(axis)
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n == 0)
            .map(|(idx, _)| idx)
            .collect()
    }
}
