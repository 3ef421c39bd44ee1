//! Growthfit: empirical time-complexity estimation
//!
//! Measures how long a target takes at increasing input sizes and names the
//! asymptotic growth class that best explains the timings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ Calibration │──►│ Sampling    │──►│ Measurement │──►│ Classifier  │
//! │ Search      │   │ Plan        │   │ Table       │   │ (5 fits)    │
//! └──────┬──────┘   └──────┬──────┘   └─────────────┘   └─────────────┘
//!        │                 │                 ▲
//!        └────────►┌───────┴─────────┐       │
//!                  │ SampleAggregator│───────┘
//!                  │ (timeout-bound) │
//!                  └─────────────────┘
//! ```
//!
//! The calibration search finds a size whose run time is close to the
//! target, the sampling plan spreads evenly spaced sizes below it, and the
//! classifier fits the averaged timings under five models.
//!
//! ```no_run
//! use growthfit::{AnalysisConfig, Analyzer, FnInvocation};
//!
//! # async fn demo() -> growthfit::GrowthResult<()> {
//! let target = FnInvocation::new(|n| {
//!     let v: Vec<u64> = (0..n).collect();
//!     std::hint::black_box(v);
//! });
//! let report = Analyzer::new(target, AnalysisConfig::default().with_target_time_ms(200))
//!     .run()
//!     .await?;
//! println!("{}", report.label());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod analysis;
pub mod calibration;
pub mod classify;
pub mod config;
pub mod measurement;
mod result;
pub mod sampling;

pub use analysis::{AnalysisReport, Analyzer};
pub use calibration::{
    find_calibrated_size, CalibrationOutcome, CalibrationProbe, CalibrationSearch,
    CalibrationState, StopReason,
};
pub use classify::{analyze, classify, Classification, ComplexityClass, Fit, Model, ModelFit};
pub use config::AnalysisConfig;
pub use measurement::{
    CancelToken, FnInvocation, Invocation, InvocationError, MeasurementTable, Observation,
    SampleAggregator,
};
pub use result::{GrowthError, GrowthResult};
pub use sampling::{collect_dataset, SamplingPlan};
