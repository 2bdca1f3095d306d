//! Tunables for the multiplication and elimination routines.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::LinalgError;
use crate::matrix::mul::MulStrategy;

/// Runtime knobs, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Block order at or below which Strassen multiplies directly.
    pub strassen_leaf_size: usize,
    /// Minimum number of rows below a pivot before elimination updates them in parallel.
    pub parallel_threshold: usize,
    /// Relative pivot threshold: a pivot with `|p| <= pivot_tolerance * n * max|A|`
    /// is treated as zero. The default `0.0` only rejects exact zero pivots.
    pub pivot_tolerance: f64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            strassen_leaf_size: 64,
            parallel_threshold: 64,
            pivot_tolerance: 0.0,
        }
    }
}

impl ComputeConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::InvalidParameters` if `strassen_leaf_size` is zero
    /// or `pivot_tolerance` is negative or not finite.
    pub fn try_with(
        strassen_leaf_size: usize,
        parallel_threshold: usize,
        pivot_tolerance: f64,
    ) -> Result<Self, LinalgError> {
        let config = Self {
            strassen_leaf_size,
            parallel_threshold,
            pivot_tolerance,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinalgError> {
        if self.strassen_leaf_size == 0 {
            return Err(LinalgError::InvalidParameters(
                "strassen_leaf_size must be > 0".to_string(),
            ));
        }
        if !self.pivot_tolerance.is_finite() || self.pivot_tolerance < 0.0 {
            return Err(LinalgError::InvalidParameters(format!(
                "pivot_tolerance must be finite and >= 0, got {}",
                self.pivot_tolerance
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, LinalgError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LinalgError> {
        let path = path.as_ref();
        let config = Self::from_json_str(&crate::io::read_source(path)?)?;
        log::debug!("loaded {:?} from {}", config, path.display());
        Ok(config)
    }

    /// Strassen with the configured leaf size, or the standard product.
    pub fn mul_strategy(&self, strassen: bool) -> MulStrategy {
        if strassen {
            MulStrategy::Strassen {
                leaf_size: self.strassen_leaf_size,
            }
        } else {
            MulStrategy::Standard
        }
    }
}
