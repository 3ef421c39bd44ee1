//! Result and error types for growthfit.

use thiserror::Error;

/// Result type for growthfit operations
pub type GrowthResult<T> = Result<T, GrowthError>;

/// Errors that can occur while measuring or classifying
#[derive(Debug, Error)]
pub enum GrowthError {
    /// Fewer points than the classifier needs
    #[error("Insufficient data: {points} points, at least {required} required")]
    InsufficientData {
        /// Points supplied
        points: usize,
        /// Minimum points needed
        required: usize,
    },

    /// A single model's least-squares solve did not converge
    #[error("Fit diverged for {model}")]
    FitDivergence {
        /// Model name
        model: String,
    },

    /// A measurement batch exceeded its time budget
    #[error("Measurement at size {size} timed out after {budget_ms}ms")]
    MeasurementTimeout {
        /// Input size being measured
        size: u64,
        /// Budget that was exceeded
        budget_ms: u64,
    },

    /// Calibration revisited an already attempted size
    #[error("Calibration stalled at size {size}")]
    SearchStall {
        /// Size that was revisited
        size: u64,
    },

    /// Doubling the candidate size left the representable range
    #[error("Calibration overflowed while growing from size {size}")]
    ArithmeticOverflow {
        /// Size before the overflowing step
        size: u64,
    },

    /// A trial failed during final sampling
    #[error("Sampling failed at size {size}: {message}")]
    SamplingFailed {
        /// Input size being measured
        size: u64,
        /// Failure description
        message: String,
    },

    /// Classifier inputs of different lengths
    #[error("Sizes and times have different lengths ({xs} vs {ys})")]
    LengthMismatch {
        /// Number of sizes
        xs: usize,
        /// Number of times
        ys: usize,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Worker task could not be joined
    #[error("Measurement worker failed: {message}")]
    Worker {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl GrowthError {
    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a sampling failure
    #[must_use]
    pub fn sampling_failed(size: u64, message: impl Into<String>) -> Self {
        Self::SamplingFailed {
            size,
            message: message.into(),
        }
    }
}
