//! Growthfit CLI: estimate time complexity from the command line
//!
//! ## Usage
//!
//! ```bash
//! growthfit classify times.csv                  # Classify recorded timings
//! growthfit run -- ./sort-bench {n}             # Time a command at growing sizes
//! growthfit run --target-ms 200 -- sh -c 'seq {n} | sort -n'
//! growthfit config --config analysis.yaml       # Show effective configuration
//! ```

use clap::Parser;
use growthfit::{analyze, Analyzer};
use growthfit_cli::{
    describe_label, load_analysis_config, logging, render_fits, render_report, run_config,
    ClassifyArgs, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, CommandInvocation,
    ConfigArgs, Dataset, OutputFormat, ProgressReporter, RunArgs, Verbosity,
};
use std::process::ExitCode;
use std::time::Duration;

/// How long to wait for measurement workers still blocked in a target on exit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(config.verbosity, config.color.should_color());

    match cli.command {
        Commands::Classify(args) => run_classify(&config, &args),
        Commands::Run(args) => run_analysis(&config, &args),
        Commands::Config(args) => run_config_command(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn reporter(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

fn run_classify(config: &CliConfig, args: &ClassifyArgs) -> CliResult<()> {
    let dataset = Dataset::from_path(&args.file)?;
    let classification = analyze(&dataset.sizes, &dataset.times)?;

    match OutputFormat::from(args.format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        OutputFormat::Text => {
            if !classification.label.is_determined() {
                reporter(config).warning(&format!(
                    "{} points is not enough to classify",
                    dataset.len()
                ));
            }
            if args.show_fits {
                print!("{}", render_fits(&classification));
            }
            println!("{}", classification.label);
        }
    }
    Ok(())
}

fn run_analysis(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let analysis_config = run_config(args)?;
    let invocation = CommandInvocation::new(&args.command)?;
    let mut progress = reporter(config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create runtime: {e}")))?;

    progress.start_spinner(&format!("Timing `{}`", args.command.join(" ")));
    let analyzer = Analyzer::new(invocation, analysis_config);
    let result = runtime.block_on(analyzer.run());
    progress.finish();
    // A timed-out target may still hold a blocking worker
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            progress.failure("analysis aborted");
            return Err(e.into());
        }
    };

    match OutputFormat::from(args.format) {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => {
            progress.success(&format!("{} sizes measured", report.table.len()));
            if config.verbosity.is_verbose() && report.absent_trials > 0 {
                progress.info(&format!(
                    "{} trials timed out or failed",
                    report.absent_trials
                ));
            }
            print!("{}", render_report(&report, args.print_times, args.show_fits));
            if !report.label().is_determined() {
                progress.warning(&describe_label(report.label()));
            }
        }
    }
    Ok(())
}

fn run_config_command(args: &ConfigArgs) -> CliResult<()> {
    let config = load_analysis_config(args.config.as_deref())?;
    config.validate()?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
