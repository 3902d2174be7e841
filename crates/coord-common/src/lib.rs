//! Common types shared across the GRIB coordinate index crates.

pub mod error;
pub mod level;
pub mod time;
pub mod value;

pub use error::{IndexError, IndexResult};
pub use level::{EnsMember, VertLevel};
pub use time::{parse_runtime, run_hour, Time2D, TimeParseError, TimeUnit};
pub use value::{CoordValue, CoordinateKind};
