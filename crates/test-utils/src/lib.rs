//! Shared test utilities for the GRIB coordinate index workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Runtime, offset and level generators
//! - Fully populated `CoordinateND` fixtures
//! - Approximate-equality assertions
//! - Tracing setup for tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, init_test_tracing};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Install a `tracing` subscriber for tests.
///
/// Honors `RUST_LOG` and defaults to `debug` for the index crates. Safe to
/// call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coord_index=debug,coord_common=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert a sparse array's density equals `count / total` exactly.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_density;
///
/// assert_density!(sparse, 273, 300);
/// ```
#[macro_export]
macro_rules! assert_density {
    ($sparse:expr, $count:expr, $total:expr) => {{
        let sparse = &$sparse;
        assert_eq!(sparse.count(), $count, "occupied cell count");
        assert_eq!(sparse.total_size(), $total, "total cell count");
        $crate::assert_approx_eq!(sparse.density(), ($count as f64) / ($total as f64), 1e-12);
    }};
}
