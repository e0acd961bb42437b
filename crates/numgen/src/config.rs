use crate::{Error, Result};

/// Maximum number of values a single run may hold.
pub const TOTAL_LIMIT: usize = 10_000_000;

/// Buffer length at which the even producer is allowed to start.
pub const EVEN_THRESHOLD: usize = 2_500_000;

/// Exclusive upper bound of every generated magnitude.
pub const UPPER_BOUND: i32 = 10_000_000;

/// Parameters of one generation run.
///
/// The defaults are the production workload: ten million values, evens gated
/// behind the first two and a half million, magnitudes below ten million.
/// Smaller values exist so the same orchestration can be exercised cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationConfig {
    total_limit: usize,
    even_threshold: usize,
    upper_bound: i32,
}

impl GenerationConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if:
    /// - `total_limit` is zero.
    /// - `even_threshold` exceeds `total_limit`. The gate would never open and
    ///   the even branch would never finish.
    /// - `upper_bound` is below 2, leaving no range to draw odd or even values
    ///   from.
    pub fn new(total_limit: usize, even_threshold: usize, upper_bound: i32) -> Result<Self> {
        if total_limit == 0 {
            return Err(Error::InvalidConfig {
                reason: "total limit must be greater than 0".to_string(),
            });
        }

        if even_threshold > total_limit {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "even threshold ({even_threshold}) exceeds total limit ({total_limit})"
                ),
            });
        }

        if upper_bound < 2 {
            return Err(Error::InvalidConfig {
                reason: format!("upper bound ({upper_bound}) must be at least 2"),
            });
        }

        Ok(Self {
            total_limit,
            even_threshold,
            upper_bound,
        })
    }

    pub const fn total_limit(&self) -> usize {
        self.total_limit
    }

    pub const fn even_threshold(&self) -> usize {
        self.even_threshold
    }

    pub const fn upper_bound(&self) -> i32 {
        self.upper_bound
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            total_limit: TOTAL_LIMIT,
            even_threshold: EVEN_THRESHOLD,
            upper_bound: UPPER_BOUND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_production_constants() {
        let config = GenerationConfig::default();
        assert_eq!(config.total_limit(), 10_000_000);
        assert_eq!(config.even_threshold(), 2_500_000);
        assert_eq!(config.upper_bound(), 10_000_000);
    }

    #[test]
    fn accepts_threshold_equal_to_limit() {
        let config = GenerationConfig::new(100, 100, 1_000).unwrap();
        assert_eq!(config.even_threshold(), 100);
    }

    #[test]
    fn rejects_unreachable_threshold() {
        let err = GenerationConfig::new(100, 101, 1_000).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_zero_limit_and_tiny_bound() {
        assert!(GenerationConfig::new(0, 0, 1_000).is_err());
        assert!(GenerationConfig::new(10, 5, 1).is_err());
    }
}
