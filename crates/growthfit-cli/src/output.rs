//! Output formatting and progress reporting

use console::{style, Term};
use growthfit::{AnalysisReport, Classification, ComplexityClass, Fit};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress and status messages on stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner until [`finish`](Self::finish) is called
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    /// Remove the spinner
    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

/// Text for a label; the undetermined class has an empty label
#[must_use]
pub fn describe_label(label: ComplexityClass) -> String {
    if label.is_determined() {
        label.to_string()
    } else {
        "undetermined (fewer than 10 points)".to_string()
    }
}

/// One line per model: name, points used, score and coefficients
#[must_use]
pub fn render_fits(classification: &Classification) -> String {
    let mut out = String::new();
    for model_fit in &classification.fits {
        let coefficients = match &model_fit.fit {
            Fit::Coefficients(c) => c
                .iter()
                .map(|v| format!("{v:.6e}"))
                .collect::<Vec<_>>()
                .join(", "),
            Fit::Diverged => "diverged".to_string(),
        };
        let residual = model_fit
            .residual
            .map_or_else(|| "-".to_string(), |r| format!("{r:.3e}"));
        let _ = writeln!(
            out,
            "{:<17} points={:<5} score={:<12.6e} rss={residual:<10} [{coefficients}]",
            model_fit.model.name(),
            model_fit.points,
            model_fit.score,
        );
    }
    if let Some(score) = classification.linearithmic_score {
        let _ = writeln!(out, "{:<17} score={score:.6e}", "linearithmic_min");
    }
    out
}

/// Size, trial count and average time of every measured size
#[must_use]
pub fn render_times(
    table: &BTreeMap<u64, Vec<Option<f64>>>,
    averages: &BTreeMap<u64, Option<f64>>,
) -> String {
    let mut out = format!("{:>20} {:>7} {:>14}\n", "size", "trials", "avg_ms");
    for (size, times) in table {
        let average = averages
            .get(size)
            .copied()
            .flatten()
            .map_or_else(|| "-".to_string(), |avg| format!("{avg:.3}"));
        let _ = writeln!(out, "{size:>20} {:>7} {average:>14}", times.len());
    }
    out
}

/// Text summary of a full analysis
#[must_use]
pub fn render_report(report: &AnalysisReport, print_times: bool, show_fits: bool) -> String {
    let mut out = String::new();
    let origin = if report.calibrated {
        "calibrated"
    } else {
        "configured"
    };
    let _ = writeln!(out, "Limit:      {} ({origin})", report.limit);
    if let Some(calibration) = &report.calibration {
        let _ = writeln!(
            out,
            "Probes:     {} ({:?})",
            calibration.probes.len(),
            calibration.reason
        );
    }
    let _ = writeln!(out, "Points:     {}", report.sizes.len());
    if print_times {
        out.push('\n');
        out.push_str(&render_times(&report.table, &report.averages));
        out.push('\n');
    }
    if show_fits {
        out.push_str(&render_fits(&report.classification));
    }
    let _ = writeln!(out, "Complexity: {}", describe_label(report.label()));
    out
}
