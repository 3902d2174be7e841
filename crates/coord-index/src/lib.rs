//! Coordinate unionization and sparse indexing for GRIB collections.
//!
//! A collection is scanned into many partitions, each with its own local
//! axes (runtimes, forecast offsets, vertical levels, ensemble members) and
//! a sparse grid of record references. This crate merges those local axes
//! into one canonical axis per kind and re-expresses every partition on the
//! canonical axes, so the whole collection can be queried through a single
//! index.
//!
//! # Architecture
//!
//! ```text
//! Scanner
//!      │  CoordinateNDBuilder::add_record(values, record)
//!      ▼
//! CoordinateND (local axes + SparseArray)        ... one per partition
//!      │
//!      ├─► CoordinateUniquify::add_coordinates    (values merged per kind,
//!      │                                            Time2D via the unionizer)
//!      ├─► CoordinateUniquify::finish             (canonical axes frozen)
//!      │
//!      └─► CoordinateUniquify::reindex            (local idx -> canonical idx)
//!               │
//!               ▼
//!          CoordinateND on canonical axes
//!               │
//!               ▼
//!          CoordinateSharer                      (one copy of each axis
//!                                                  per group)
//! ```
//!
//! # Example
//!
//! ```
//! use coord_common::{CoordinateKind, VertLevel};
//! use coord_index::{CoordinateNDBuilder, CoordinateUniquify};
//!
//! let mut a = CoordinateNDBuilder::new(&[CoordinateKind::Time, CoordinateKind::Vert]);
//! a.add_record(vec![0.into(), VertLevel::single(500.0).into()], "a0").unwrap();
//! let a = a.finish().unwrap();
//!
//! let mut b = CoordinateNDBuilder::new(&[CoordinateKind::Time, CoordinateKind::Vert]);
//! b.add_record(vec![6.into(), VertLevel::single(500.0).into()], "b6").unwrap();
//! let b = b.finish().unwrap();
//!
//! let mut uniquify = CoordinateUniquify::new();
//! uniquify.add_coordinates(a.coordinates()).unwrap();
//! uniquify.add_coordinates(b.coordinates()).unwrap();
//! uniquify.finish().unwrap();
//!
//! let merged = uniquify.reindex(&b).unwrap().coordinate;
//! assert_eq!(merged.shape(), &[2, 1]);
//! assert_eq!(
//!     merged.get(&[6.into(), VertLevel::single(500.0).into()]).unwrap(),
//!     Some(&"b6")
//! );
//! ```

pub mod axis;
pub mod builder;
pub mod config;
pub mod coordinate;
pub mod info;
pub mod nd;
pub mod sharer;
pub mod sparse;
pub mod time2d;
pub mod unionizer;
pub mod uniquify;

// Re-export commonly used types at crate root
pub use axis::Axis;
pub use builder::CoordinateBuilder;
pub use config::IndexConfig;
pub use coordinate::{CoordValues, Coordinate};
pub use info::Occupancy;
pub use nd::{CoordinateND, CoordinateNDBuilder};
pub use sharer::CoordinateSharer;
pub use sparse::{SparseArray, SparseArrayBuilder};
pub use time2d::{BestTime, CoordinateTime2D, TimeLayout};
pub use unionizer::CoordinateTime2DUnionizer;
pub use uniquify::{CoordinateUniquify, Reindexed};

pub use coord_common::{CoordValue, CoordinateKind, IndexError, IndexResult};
