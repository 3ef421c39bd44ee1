//! Growthfit CLI Library
//!
//! Command-line interface for the growthfit complexity estimator.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
pub mod dataset;
mod error;
pub mod invocation;
pub mod logging;
mod output;

pub use commands::{ClassifyArgs, Cli, ColorArg, Commands, ConfigArgs, FormatArg, RunArgs};
pub use config::{load_analysis_config, run_config, CliConfig, ColorChoice, Verbosity};
pub use dataset::Dataset;
pub use error::{CliError, CliResult};
pub use invocation::CommandInvocation;
pub use output::{
    describe_label, render_fits, render_report, render_times, OutputFormat, ProgressReporter,
};
