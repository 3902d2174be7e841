//! Configuration for index building.

use coord_common::TimeUnit;
use serde::{Deserialize, Serialize};

/// Configuration for coordinate unionization and reindexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Reindex sources on the rayon pool when the batch is large enough.
    pub parallel_reindex: bool,

    /// Smallest batch that is worth reindexing in parallel.
    pub parallel_min_sources: usize,

    /// Upper bound on the cell count of a reindexed sparse array.
    pub max_total_size: usize,

    /// Group runs by cycle hour when 2D time axes are not orthogonal.
    pub detect_regular: bool,

    /// Unit forecast offsets are counted in.
    pub time_unit: TimeUnit,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            parallel_reindex: true,
            parallel_min_sources: 8,
            max_total_size: 1 << 31,
            detect_regular: true,
            time_unit: TimeUnit::Hour,
        }
    }
}

impl IndexConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRIB_INDEX_PARALLEL_REINDEX") {
            config.parallel_reindex = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("GRIB_INDEX_PARALLEL_MIN_SOURCES") {
            if let Ok(n) = val.parse() {
                config.parallel_min_sources = n;
            }
        }

        if let Ok(val) = std::env::var("GRIB_INDEX_MAX_TOTAL_SIZE") {
            if let Ok(n) = val.parse() {
                config.max_total_size = n;
            }
        }

        if let Ok(val) = std::env::var("GRIB_INDEX_DETECT_REGULAR") {
            config.detect_regular = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("GRIB_INDEX_TIME_UNIT") {
            config.time_unit = TimeUnit::from_str(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.parallel_min_sources == 0 {
            return Err("parallel_min_sources must be > 0".to_string());
        }

        if self.max_total_size == 0 {
            return Err("max_total_size must be > 0".to_string());
        }

        if self.max_total_size > u32::MAX as usize {
            return Err(format!(
                "max_total_size must fit a u32 track entry (<= {})",
                u32::MAX
            ));
        }

        Ok(())
    }

    /// Whether a batch of `sources` should be reindexed in parallel.
    pub fn use_parallel(&self, sources: usize) -> bool {
        self.parallel_reindex && sources >= self.parallel_min_sources
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = IndexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.time_unit, TimeUnit::Hour);
        assert!(config.detect_regular);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = IndexConfig {
            parallel_min_sources: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IndexConfig {
            max_total_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_use_parallel() {
        let mut config = IndexConfig::default();
        assert!(!config.use_parallel(3));
        assert!(config.use_parallel(8));

        config.parallel_reindex = false;
        assert!(!config.use_parallel(100));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag("0"));
    }
}
