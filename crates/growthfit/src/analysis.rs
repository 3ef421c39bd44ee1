//! End-to-end analysis: calibrate, sample, classify

use crate::calibration::{find_calibrated_size, CalibrationOutcome};
use crate::classify::{analyze, Classification, ComplexityClass};
use crate::config::AnalysisConfig;
use crate::measurement::{Invocation, MeasurementTable, SampleAggregator};
use crate::result::GrowthResult;
use crate::sampling::{collect_dataset, SamplingPlan};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Everything one analysis run produced
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Exclusive upper bound of the sampled sizes
    pub limit: u64,
    /// Whether the calibration search ran
    pub calibrated: bool,
    /// Calibration trace, if the search ran
    pub calibration: Option<CalibrationOutcome>,
    /// Sizes that were sampled
    pub plan: SamplingPlan,
    /// Raw observations, absent trials included
    pub table: BTreeMap<u64, Vec<Option<f64>>>,
    /// Average of the present trials per size, `None` when every trial was absent
    pub averages: BTreeMap<u64, Option<f64>>,
    /// Trials that timed out or failed, across all sizes
    pub absent_trials: usize,
    /// Classifier input: sizes in ascending order
    pub sizes: Vec<f64>,
    /// Classifier input: average milliseconds per size
    pub times: Vec<f64>,
    /// Classifier output
    pub classification: Classification,
}

impl AnalysisReport {
    /// The chosen growth class
    #[must_use]
    pub const fn label(&self) -> ComplexityClass {
        self.classification.label
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> GrowthResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs a complete analysis of one target
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    aggregator: SampleAggregator,
}

impl Analyzer {
    /// Analyzer for `invocation` with its own measurement table
    #[must_use]
    pub fn new(invocation: impl Invocation + 'static, config: AnalysisConfig) -> Self {
        Self {
            config,
            aggregator: SampleAggregator::new(invocation),
        }
    }

    /// Analyzer over an existing aggregator
    #[must_use]
    pub const fn with_aggregator(aggregator: SampleAggregator, config: AnalysisConfig) -> Self {
        Self { config, aggregator }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Table that receives every observation
    #[must_use]
    pub fn table(&self) -> &Arc<MeasurementTable> {
        self.aggregator.table()
    }

    /// Calibrate (unless the range is too small or `point_only` is set),
    /// sample up to the limit and classify the resulting dataset
    pub async fn run(&self) -> GrowthResult<AnalysisReport> {
        self.config.validate()?;

        let calibration = if self.config.skips_calibration() {
            info!(limit = self.config.max_size, "calibration skipped");
            None
        } else {
            Some(find_calibrated_size(&self.aggregator, &self.config).await?)
        };
        let limit = calibration
            .as_ref()
            .map_or(self.config.max_size, |outcome| outcome.size);

        let plan = SamplingPlan::new(limit, self.config.point_count);
        info!(limit, step = plan.step, points = plan.len(), "sampling plan");
        collect_dataset(&self.aggregator, &plan, &self.config).await?;

        let table = self.table();
        let (sizes, times) = table.dataset();
        let absent_trials = table.absent_count();
        let classification = analyze(&sizes, &times)?;
        info!(
            label = %classification.label,
            points = sizes.len(),
            absent_trials,
            "analysis finished"
        );

        Ok(AnalysisReport {
            limit,
            calibrated: calibration.is_some(),
            calibration,
            plan,
            table: table.snapshot(),
            averages: table.averages(),
            absent_trials,
            sizes,
            times,
            classification,
        })
    }
}
