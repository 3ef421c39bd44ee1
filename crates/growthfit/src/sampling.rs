//! Sampling plan
//!
//! Evenly spaced input sizes from 0 up to (not including) the calibrated
//! limit. Every planned size must produce a time: a timeout or failure here
//! means the limit was wrong, so the whole run is aborted.

use crate::config::AnalysisConfig;
use crate::measurement::SampleAggregator;
use crate::result::{GrowthError, GrowthResult};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Evenly spaced sizes in `[0, limit)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPlan {
    /// Exclusive upper bound
    pub limit: u64,
    /// Distance between consecutive sizes, at least 1
    pub step: u64,
}

impl SamplingPlan {
    /// Plan roughly `point_count` sizes below `limit`
    #[must_use]
    pub fn new(limit: u64, point_count: u64) -> Self {
        let step = if point_count == 0 {
            1
        } else {
            (limit / point_count).max(1)
        };
        Self { limit, step }
    }

    /// The planned sizes, strictly increasing from 0
    pub fn sizes(&self) -> impl Iterator<Item = u64> {
        let Self { limit, step } = *self;
        std::iter::successors(Some(0_u64), move |&size| size.checked_add(step))
            .take_while(move |&size| size < limit)
    }

    /// Number of planned sizes
    #[must_use]
    pub fn len(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            ((self.limit - 1) / self.step + 1) as usize
        }
    }

    /// Whether the plan has no sizes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

/// Measure every planned size with `sampling_repeats` trials under the sampling budget
///
/// Returns the number of sizes measured.
pub async fn collect_dataset(
    aggregator: &SampleAggregator,
    plan: &SamplingPlan,
    config: &AnalysisConfig,
) -> GrowthResult<usize> {
    let budget = config.sampling_budget();
    let mut measured = 0;
    for size in plan.sizes() {
        info!(size, "sampling");
        let observations = aggregator
            .measure_within(size, config.sampling_repeats, budget)
            .await
            .map_err(|e| {
                error!(size, error = %e, "sampling aborted");
                e
            })?;
        if observations.len() < config.sampling_repeats
            || observations.iter().any(|o| !o.is_present())
        {
            error!(size, "trial failed during sampling");
            return Err(GrowthError::sampling_failed(
                size,
                "a trial produced no measurement",
            ));
        }
        measured += 1;
    }
    Ok(measured)
}
