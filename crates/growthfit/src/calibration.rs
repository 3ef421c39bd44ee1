//! Calibration search
//!
//! Finds an input size whose average trial time lands in the window
//! `[target·(1−tol), target·(1+tol)]`. The search doubles the size until a
//! trial is too slow, then bisects the bracket. It always terminates: a size
//! past `max_allowed` is clamped, a revisited size stops the search, and an
//! overflowing doubling step saturates.
//!
//! The returned size is the best candidate found, not a guarantee that its
//! time lies inside the window.

use crate::config::AnalysisConfig;
use crate::measurement::{mean_elapsed, SampleAggregator};
use crate::result::{GrowthError, GrowthResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The probe's average time was inside the window
    WithinTolerance,
    /// The next candidate exceeded `max_allowed`
    Clamped,
    /// The next candidate had already been measured
    Stalled,
    /// Doubling the candidate left the `u64` range
    Overflowed,
}

/// Mutable state of the search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    /// Largest size known to be too fast
    pub low: u64,
    /// Smallest size known to be too slow, or `max_allowed`
    pub high: u64,
    /// Size to measure next
    pub current: u64,
    /// Whether a too-slow size has been seen
    pub window_found: bool,
    /// Sizes already measured
    pub attempted: BTreeSet<u64>,
    /// Upper bound on candidates
    pub max_allowed: u64,
    /// Target average time in milliseconds
    pub target_time_ms: f64,
    /// Relative tolerance around the target
    pub tolerance: f64,
}

/// One probe of the search, kept for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProbe {
    /// Size that was measured
    pub size: u64,
    /// Average time, `None` if every trial timed out or failed
    pub average_ms: Option<f64>,
    /// Candidate chosen after this probe
    pub next: u64,
}

/// Result of a calibration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    /// Best size found
    pub size: u64,
    /// Why the search ended
    pub reason: StopReason,
    /// Every probe in order
    pub probes: Vec<CalibrationProbe>,
}

/// Step function of the doubling-then-bisecting search
#[derive(Debug, Clone)]
pub struct CalibrationSearch {
    state: CalibrationState,
    stop_reason: Option<StopReason>,
}

impl CalibrationSearch {
    /// Start a search over `[min_allowed, max_allowed]`
    #[must_use]
    pub fn new(min_allowed: u64, max_allowed: u64, target_time_ms: f64, tolerance: f64) -> Self {
        Self {
            state: CalibrationState {
                low: min_allowed,
                high: max_allowed,
                current: min_allowed,
                window_found: false,
                attempted: BTreeSet::new(),
                max_allowed,
                target_time_ms,
                tolerance,
            },
            stop_reason: None,
        }
    }

    /// Start a search with the bounds and window of a configuration
    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.min_size,
            config.max_size,
            config.target_time_ms as f64,
            config.tolerance,
        )
    }

    /// Size to measure next
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.state.current
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Why the search stopped, once it has
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Whether the search has reached a terminal state
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.stop_reason.is_some()
    }

    /// Lower edge of the accepted time window in milliseconds
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.state.target_time_ms - self.state.target_time_ms * self.state.tolerance
    }

    /// Upper edge of the accepted time window in milliseconds
    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.state.target_time_ms + self.state.target_time_ms * self.state.tolerance
    }

    /// Feed the average time measured at [`current`](Self::current)
    ///
    /// `None` means the size could not be evaluated and counts as too slow.
    /// Returns `true` once the search is finished.
    pub fn step(&mut self, average_ms: Option<f64>) -> bool {
        if self.is_finished() {
            return true;
        }
        let average = average_ms.unwrap_or(f64::INFINITY);
        let (lower, upper) = (self.lower_bound(), self.upper_bound());
        let state = &mut self.state;
        state.attempted.insert(state.current);

        let mut overflowed = false;
        let mut reason = None;

        if average < lower {
            state.low = state.current;
            if state.window_found {
                state.current = midpoint(state.low, state.high);
            } else {
                match state.current.checked_mul(2).and_then(|v| v.checked_add(1)) {
                    Some(next) => state.current = next,
                    None => {
                        overflowed = true;
                        state.current = u64::MAX;
                    }
                }
            }
        } else if average > upper {
            state.high = state.current;
            state.window_found = true;
            state.current = midpoint(state.low, state.high);
            if state.attempted.contains(&state.current) {
                // Never step below the largest size known to be too fast
                match state.current.checked_sub(1) {
                    Some(next) if next >= state.low => state.current = next,
                    _ => {
                        state.current = state.low;
                        reason = Some(StopReason::Stalled);
                    }
                }
            }
        } else {
            state.window_found = true;
            reason = Some(StopReason::WithinTolerance);
        }

        if state.current > state.max_allowed {
            state.current = state.max_allowed;
            state.window_found = true;
            reason = reason.or(Some(StopReason::Clamped));
        }
        if reason.is_none() && state.attempted.contains(&state.current) {
            state.window_found = true;
            reason = Some(StopReason::Stalled);
        }
        if overflowed {
            state.window_found = true;
            reason = Some(StopReason::Overflowed);
        }

        self.stop_reason = reason;
        self.stop_reason.is_some()
    }
}

fn midpoint(low: u64, high: u64) -> u64 {
    ((u128::from(low) + u128::from(high)) / 2) as u64
}

/// Drive a [`CalibrationSearch`] by measuring each candidate under the calibration budget
///
/// A probe that times out counts as too slow; the search goes on.
pub async fn find_calibrated_size(
    aggregator: &SampleAggregator,
    config: &AnalysisConfig,
) -> GrowthResult<CalibrationOutcome> {
    config.validate()?;
    let mut search = CalibrationSearch::from_config(config);
    let budget = config.calibration_budget();
    let mut probes = Vec::new();

    loop {
        let size = search.current();
        info!(size, "calibration probe");
        let average_ms = match aggregator.measure_within(size, config.repeats, budget).await {
            Ok(observations) => mean_elapsed(&observations),
            Err(GrowthError::MeasurementTimeout { .. }) => None,
            Err(GrowthError::Worker { message }) => {
                warn!(size, %message, "calibration worker failed");
                None
            }
            Err(e) => return Err(e),
        };
        let finished = search.step(average_ms);
        info!(size, ?average_ms, next = search.current(), "calibration step");
        probes.push(CalibrationProbe {
            size,
            average_ms,
            next: search.current(),
        });
        if finished {
            break;
        }
    }

    let reason = search.stop_reason().unwrap_or(StopReason::Stalled);
    let early_stop = match reason {
        StopReason::Stalled => Some(GrowthError::SearchStall {
            size: search.current(),
        }),
        StopReason::Overflowed => Some(GrowthError::ArithmeticOverflow {
            size: search.state().low,
        }),
        StopReason::WithinTolerance | StopReason::Clamped => None,
    };
    if let Some(error) = early_stop {
        warn!(%error, "calibration stopped early");
    }
    info!(size = search.current(), ?reason, "calibration finished");

    Ok(CalibrationOutcome {
        size: search.current(),
        reason,
        probes,
    })
}
