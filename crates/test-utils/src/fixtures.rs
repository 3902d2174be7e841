//! Common index fixtures.
//!
//! These represent the scenarios the index is tested against: fully
//! populated partitions, and pairs of partitions whose axes overlap.

use coord_common::IndexResult;
use coord_index::{Coordinate, CoordinateND, SparseArrayBuilder};

use crate::generators::{
    offsets, pressure_levels, reference_run, runtime_coordinate, runtimes, time_coordinate,
    vert_coordinate,
};

/// A record reference as a scanner would emit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub file: u32,
    pub pos: u64,
}

/// Index over `axes` with every cell filled by `make(flat_index)`.
pub fn full_nd_with<T>(axes: Vec<Coordinate>, mut make: impl FnMut(usize) -> T) -> IndexResult<CoordinateND<T>> {
    let shape = axes.iter().map(Coordinate::size).collect();
    let mut builder = SparseArrayBuilder::new(shape)?;
    for flat in 0..builder.total_size() {
        builder.set_flat(flat, make(flat))?;
    }
    CoordinateND::new(axes, builder.finish()?)
}

/// Index over `axes` with every cell filled; records are tagged with `file`.
pub fn full_nd(axes: Vec<Coordinate>, file: u32) -> CoordinateND<RecordRef> {
    full_nd_with(axes, |flat| RecordRef {
        file,
        pos: flat as u64,
    })
    .expect("full fixture builds")
}

/// Partition with size-10 runtime, time and level axes, fully populated.
///
/// Runs are 6 h apart from [`reference_run`], offsets 0..27 every 3 h,
/// levels 1000..550 hPa.
pub fn partition_a() -> CoordinateND<RecordRef> {
    full_nd(
        vec![
            runtime_coordinate(&runtimes(reference_run(), 10, 6)),
            time_coordinate(&offsets(0, 10, 3)),
            vert_coordinate(&pressure_levels(10)),
        ],
        1,
    )
}

/// Partition overlapping [`partition_a`]: one more run, one more offset,
/// same levels. Together they give canonical shape `[11, 11, 10]`.
pub fn partition_b() -> CoordinateND<RecordRef> {
    full_nd(
        vec![
            runtime_coordinate(&runtimes(reference_run(), 11, 6)),
            time_coordinate(&offsets(0, 11, 3)),
            vert_coordinate(&pressure_levels(10)),
        ],
        2,
    )
}
