//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Growthfit: estimate the time complexity of a program by timing it
#[derive(Parser, Debug)]
#[command(name = "growthfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a recorded dataset of sizes and times
    Classify(ClassifyArgs),

    /// Time a command at growing input sizes and classify it
    ///
    /// Every `{n}` in the command's arguments is replaced by the input size.
    Run(RunArgs),

    /// Show the effective analysis configuration
    Config(ConfigArgs),
}

/// Arguments for the classify command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Dataset file: CSV `size,time` lines or JSON `{"sizes": [..], "times": [..]}`
    pub file: PathBuf,

    /// Print every model's coefficients
    #[arg(long)]
    pub show_fits: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// YAML analysis configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Calibration target time in milliseconds
    #[arg(long)]
    pub target_ms: Option<u64>,

    /// Relative tolerance around the target time
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Smallest input size
    #[arg(long)]
    pub min: Option<u64>,

    /// Largest input size
    #[arg(long)]
    pub max: Option<u64>,

    /// Number of sampling points
    #[arg(long)]
    pub points: Option<u64>,

    /// Trials per calibration probe
    #[arg(long)]
    pub repeats: Option<usize>,

    /// Trials per sampling point
    #[arg(long)]
    pub sampling_repeats: Option<usize>,

    /// Skip calibration and sample up to the largest size
    #[arg(long)]
    pub point_only: bool,

    /// Print the measured times
    #[arg(long)]
    pub print_times: bool,

    /// Print every model's coefficients
    #[arg(long)]
    pub show_fits: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,

    /// Command to time, after `--`
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// YAML analysis configuration to load
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;
    use crate::output::OutputFormat;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    mod cli_tests {
        use super::*;

        #[test]
        fn test_verify_cli() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }

        #[test]
        fn test_global_flags() {
            let cli = parse(&["growthfit", "-vv", "--color", "never", "config"]);
            assert_eq!(cli.verbose, 2);
            assert!(!cli.quiet);
            assert_eq!(ColorChoice::from(cli.color), ColorChoice::Never);
        }

        #[test]
        fn test_missing_subcommand_is_error() {
            assert!(Cli::try_parse_from(["growthfit"]).is_err());
        }
    }

    mod classify_tests {
        use super::*;

        #[test]
        fn test_classify_args() {
            let cli = parse(&["growthfit", "classify", "data.csv", "--show-fits", "-f", "json"]);
            match cli.command {
                Commands::Classify(args) => {
                    assert_eq!(args.file, PathBuf::from("data.csv"));
                    assert!(args.show_fits);
                    assert_eq!(OutputFormat::from(args.format), OutputFormat::Json);
                }
                _ => panic!("expected classify command"),
            }
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_trailing_command() {
            let cli = parse(&[
                "growthfit", "run", "--target-ms", "200", "--points", "20", "--", "sort", "-n",
                "{n}",
            ]);
            match cli.command {
                Commands::Run(args) => {
                    assert_eq!(args.target_ms, Some(200));
                    assert_eq!(args.points, Some(20));
                    assert_eq!(args.command, vec!["sort", "-n", "{n}"]);
                    assert!(args.min.is_none());
                }
                _ => panic!("expected run command"),
            }
        }

        #[test]
        fn test_run_requires_command() {
            assert!(Cli::try_parse_from(["growthfit", "run"]).is_err());
        }

        #[test]
        fn test_flags() {
            let cli = parse(&[
                "growthfit",
                "run",
                "--point-only",
                "--print-times",
                "--max",
                "1000",
                "--",
                "true",
            ]);
            match cli.command {
                Commands::Run(args) => {
                    assert!(args.point_only);
                    assert!(args.print_times);
                    assert_eq!(args.max, Some(1000));
                }
                _ => panic!("expected run command"),
            }
        }
    }
}
