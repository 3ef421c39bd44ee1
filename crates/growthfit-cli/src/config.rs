//! CLI configuration

use crate::commands::RunArgs;
use crate::error::CliResult;
use growthfit::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - calibration progress
    Verbose,
    /// Debug - every trial and fit
    Debug,
}

impl Verbosity {
    /// Map the `-q` flag and `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Log filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// Load an analysis configuration from YAML, or the defaults without a file
pub fn load_analysis_config(path: Option<&Path>) -> CliResult<AnalysisConfig> {
    let config = match path {
        Some(path) => AnalysisConfig::from_yaml_file(path)?,
        None => AnalysisConfig::default(),
    };
    Ok(config)
}

/// Configuration for `run`: the file (if any) with command-line overrides applied
pub fn run_config(args: &RunArgs) -> CliResult<AnalysisConfig> {
    let mut config = load_analysis_config(args.config.as_deref())?;
    if let Some(ms) = args.target_ms {
        config = config.with_target_time_ms(ms);
    }
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    let (min, max) = (
        args.min.unwrap_or(config.min_size),
        args.max.unwrap_or(config.max_size),
    );
    config = config.with_size_range(min, max);
    if let Some(points) = args.points {
        config = config.with_point_count(points);
    }
    if let Some(repeats) = args.repeats {
        config = config.with_repeats(repeats);
    }
    if let Some(repeats) = args.sampling_repeats {
        config = config.with_sampling_repeats(repeats);
    }
    if args.point_only {
        config = config.with_point_only(true);
    }
    config.validate()?;
    Ok(config)
}
