//! Coordinate axes bound to a sparse array of records.

use coord_common::{CoordValue, CoordinateKind, IndexError, IndexResult};
use std::fmt::{self, Write};

use crate::builder::CoordinateBuilder;
use crate::coordinate::Coordinate;
use crate::info::Occupancy;
use crate::sparse::{SparseArray, SparseArrayBuilder};

/// Ordered axes plus one sparse array shaped like them.
///
/// Lookups go value tuple -> per-axis index (binary search) -> flat index
/// -> record.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateND<T> {
    coordinates: Vec<Coordinate>,
    sparse: SparseArray<T>,
}

impl<T> CoordinateND<T> {
    /// Bind axes to a sparse array; the array shape must list the axis sizes
    /// in the same order.
    pub fn new(coordinates: Vec<Coordinate>, sparse: SparseArray<T>) -> IndexResult<Self> {
        let sizes: Vec<usize> = coordinates.iter().map(Coordinate::size).collect();
        if sizes != sparse.shape() {
            return Err(IndexError::configuration(format!(
                "sparse array shape {:?} does not match coordinate sizes {:?}",
                sparse.shape(),
                sizes
            )));
        }
        Ok(Self {
            coordinates,
            sparse,
        })
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn sparse_array(&self) -> &SparseArray<T> {
        &self.sparse
    }

    pub fn rank(&self) -> usize {
        self.coordinates.len()
    }

    pub fn shape(&self) -> &[usize] {
        self.sparse.shape()
    }

    /// First axis of the given kind.
    pub fn get_coordinate(&self, kind: CoordinateKind) -> Option<&Coordinate> {
        self.coordinates.iter().find(|c| c.kind() == kind)
    }

    /// Per-axis indices of a value tuple, `None` if any value is off its axis.
    pub fn indices_of(&self, values: &[CoordValue]) -> IndexResult<Option<Vec<usize>>> {
        if values.len() != self.coordinates.len() {
            return Err(IndexError::configuration(format!(
                "expected {} coordinate values, got {}",
                self.coordinates.len(),
                values.len()
            )));
        }
        Ok(self
            .coordinates
            .iter()
            .zip(values)
            .map(|(coord, value)| coord.index_of(value))
            .collect())
    }

    /// Record at a value tuple. A value missing from its axis is a miss
    /// (`Ok(None)`), not an error.
    pub fn get(&self, values: &[CoordValue]) -> IndexResult<Option<&T>> {
        match self.indices_of(values)? {
            Some(indices) => self.sparse.get(&indices),
            None => Ok(None),
        }
    }

    /// Value tuple of a flat index.
    pub fn values_at(&self, flat: usize) -> IndexResult<Vec<CoordValue>> {
        if flat >= self.sparse.total_size() {
            return Err(IndexError::out_of_bounds(0, flat, self.sparse.total_size()));
        }
        self.coordinates
            .iter()
            .zip(self.sparse.unflatten(flat))
            .enumerate()
            .map(|(axis, (coord, idx))| {
                coord
                    .get(idx)
                    .ok_or_else(|| IndexError::out_of_bounds(axis, idx, coord.size()))
            })
            .collect()
    }

    /// Occupied cells as `(value tuple, record)`, in flat order.
    pub fn records(&self) -> impl Iterator<Item = (Vec<CoordValue>, &T)> + '_ {
        self.sparse
            .iter()
            .filter_map(move |(flat, rec)| self.values_at(flat).ok().map(|vals| (vals, rec)))
    }

    /// Write a human-readable summary. When `occupancy` is given it is
    /// filled with per-axis counts of occupied cells.
    pub fn show_info<W: Write>(&self, out: &mut W, occupancy: Option<&mut Occupancy>) -> fmt::Result {
        writeln!(
            out,
            "CoordinateND rank={} shape={:?}",
            self.rank(),
            self.shape()
        )?;
        for coord in &self.coordinates {
            writeln!(out, "  {}", coord)?;
        }
        writeln!(
            out,
            "  records={} total={} density={:.3} ndups={}",
            self.sparse.count(),
            self.sparse.total_size(),
            self.sparse.density(),
            self.sparse.ndups()
        )?;

        if let Some(occ) = occupancy {
            for (flat, _) in self.sparse.iter() {
                occ.add(&self.sparse.unflatten(flat));
            }
            for (axis, coord) in self.coordinates.iter().enumerate() {
                let missing = occ.empty_indices(axis);
                if !missing.is_empty() {
                    writeln!(out, "  {} has {} empty indices", coord.kind(), missing.len())?;
                }
            }
        }
        Ok(())
    }
}

impl<T> fmt::Display for CoordinateND<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.show_info(f, None)
    }
}

/// Builds a [`CoordinateND`] from scanned records.
///
/// Each record contributes one value per axis; axes are finished first and
/// records are then placed at their resolved indices.
#[derive(Debug, Clone)]
pub struct CoordinateNDBuilder<T> {
    builders: Vec<CoordinateBuilder>,
    records: Vec<(Vec<CoordValue>, T)>,
}

impl<T> CoordinateNDBuilder<T> {
    pub fn new(kinds: &[CoordinateKind]) -> Self {
        Self::from_builders(kinds.iter().map(|&k| CoordinateBuilder::new(k)).collect())
    }

    pub fn from_builders(builders: Vec<CoordinateBuilder>) -> Self {
        Self {
            builders,
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, values: Vec<CoordValue>, record: T) -> IndexResult<()> {
        if values.len() != self.builders.len() {
            return Err(IndexError::configuration(format!(
                "record has {} coordinate values, builder has {} axes",
                values.len(),
                self.builders.len()
            )));
        }
        if let Some((builder, value)) = self
            .builders
            .iter()
            .zip(&values)
            .find(|(b, v)| b.kind() != v.kind())
        {
            return Err(IndexError::kind_mismatch(builder.kind(), value.kind()));
        }
        for (builder, value) in self.builders.iter_mut().zip(&values) {
            builder.add(*value)?;
        }
        self.records.push((values, record));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> IndexResult<CoordinateND<T>> {
        let coordinates: Vec<Coordinate> =
            self.builders.into_iter().map(CoordinateBuilder::finish).collect();
        let shape = coordinates.iter().map(Coordinate::size).collect();
        let mut sparse = SparseArrayBuilder::new(shape)?;

        for (values, record) in self.records {
            let mut indices = Vec::with_capacity(values.len());
            for (coord, value) in coordinates.iter().zip(&values) {
                let idx = coord.index_of(value).ok_or_else(|| {
                    IndexError::invariant(format!("{} value {} missing after finish", coord.kind(), value))
                })?;
                indices.push(idx);
            }
            sparse.set(&indices, record)?;
        }

        let sparse = sparse.finish()?;
        if sparse.ndups() > 0 {
            tracing::warn!(
                ndups = sparse.ndups(),
                records = sparse.count(),
                "duplicate records at the same coordinates, keeping the last"
            );
        }
        CoordinateND::new(coordinates, sparse)
    }
}
