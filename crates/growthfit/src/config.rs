//! Analysis configuration
//!
//! A plain value object handed to the calibration search, the sampling plan
//! and the analyzer. There is no process-wide configuration.

use crate::result::{GrowthError, GrowthResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default target time for one trial at the calibrated size
pub const DEFAULT_TARGET_TIME_MS: u64 = 1000;
/// Default relative tolerance around the target time
pub const DEFAULT_TOLERANCE: f64 = 0.25;
/// Default upper bound on input sizes (`i32::MAX`)
pub const DEFAULT_MAX_SIZE: u64 = 2_147_483_647;
/// Default number of planned sampling points
pub const DEFAULT_POINT_COUNT: u64 = 100;
/// Default trials per calibration probe
pub const DEFAULT_REPEATS: usize = 2;

/// Options for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Target average time per trial in milliseconds
    pub target_time_ms: u64,
    /// Accepted relative deviation from the target
    pub tolerance: f64,
    /// Smallest input size to try
    pub min_size: u64,
    /// Largest input size to try
    pub max_size: u64,
    /// Number of sampling points between 0 and the limit
    pub point_count: u64,
    /// Trials per calibration probe
    pub repeats: usize,
    /// Trials per sampling point
    pub sampling_repeats: usize,
    /// Calibration budget as a multiple of the target time
    pub calibration_timeout_factor: u32,
    /// Sampling budget as a multiple of the target time
    pub sampling_timeout_factor: u32,
    /// Skip calibration and sample up to `max_size`
    pub point_only: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_time_ms: DEFAULT_TARGET_TIME_MS,
            tolerance: DEFAULT_TOLERANCE,
            min_size: 0,
            max_size: DEFAULT_MAX_SIZE,
            point_count: DEFAULT_POINT_COUNT,
            repeats: DEFAULT_REPEATS,
            sampling_repeats: 2,
            calibration_timeout_factor: 5,
            sampling_timeout_factor: 10,
            point_only: false,
        }
    }
}

impl AnalysisConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> GrowthResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> GrowthResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> GrowthResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the target time
    #[must_use]
    pub const fn with_target_time_ms(mut self, ms: u64) -> Self {
        self.target_time_ms = ms;
        self
    }

    /// Set the tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the size bounds
    #[must_use]
    pub const fn with_size_range(mut self, min: u64, max: u64) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    /// Set the number of sampling points
    #[must_use]
    pub const fn with_point_count(mut self, points: u64) -> Self {
        self.point_count = points;
        self
    }

    /// Set the trials per calibration probe
    #[must_use]
    pub const fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Set the trials per sampling point
    #[must_use]
    pub const fn with_sampling_repeats(mut self, repeats: usize) -> Self {
        self.sampling_repeats = repeats;
        self
    }

    /// Set the timeout multipliers for calibration and sampling
    #[must_use]
    pub const fn with_timeout_factors(mut self, calibration: u32, sampling: u32) -> Self {
        self.calibration_timeout_factor = calibration;
        self.sampling_timeout_factor = sampling;
        self
    }

    /// Skip calibration
    #[must_use]
    pub const fn with_point_only(mut self, point_only: bool) -> Self {
        self.point_only = point_only;
        self
    }

    /// Budget for one calibration probe
    #[must_use]
    pub fn calibration_budget(&self) -> Duration {
        Duration::from_millis(
            self.target_time_ms
                .saturating_mul(u64::from(self.calibration_timeout_factor)),
        )
    }

    /// Budget for one sampling point
    #[must_use]
    pub fn sampling_budget(&self) -> Duration {
        Duration::from_millis(
            self.target_time_ms
                .saturating_mul(u64::from(self.sampling_timeout_factor)),
        )
    }

    /// Whether the calibration search should be skipped for this range
    #[must_use]
    pub fn skips_calibration(&self) -> bool {
        self.point_only || self.max_size.saturating_sub(self.min_size) < self.point_count
    }

    /// Check the configuration for values that cannot drive an analysis
    pub fn validate(&self) -> GrowthResult<()> {
        if self.target_time_ms == 0 {
            return Err(GrowthError::invalid_config("target_time_ms must be positive"));
        }
        if !(0.0..1.0).contains(&self.tolerance) {
            return Err(GrowthError::invalid_config(format!(
                "tolerance must be in [0, 1), got {}",
                self.tolerance
            )));
        }
        if self.min_size > self.max_size {
            return Err(GrowthError::invalid_config(format!(
                "min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        if self.point_count == 0 {
            return Err(GrowthError::invalid_config("point_count must be positive"));
        }
        if self.repeats == 0 || self.sampling_repeats == 0 {
            return Err(GrowthError::invalid_config("repeat counts must be positive"));
        }
        if self.calibration_timeout_factor == 0 || self.sampling_timeout_factor == 0 {
            return Err(GrowthError::invalid_config("timeout factors must be positive"));
        }
        Ok(())
    }
}
