use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One trial's result: elapsed milliseconds, or `None` for a timeout/failure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Input size of the trial
    pub size: u64,
    /// Elapsed wall-clock milliseconds
    pub elapsed_ms: Option<f64>,
}

impl Observation {
    /// A completed trial
    #[must_use]
    pub const fn timed(size: u64, elapsed_ms: f64) -> Self {
        Self {
            size,
            elapsed_ms: Some(elapsed_ms),
        }
    }

    /// A trial that produced no measurement
    #[must_use]
    pub const fn absent(size: u64) -> Self {
        Self {
            size,
            elapsed_ms: None,
        }
    }

    /// Whether the trial produced a time
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.elapsed_ms.is_some()
    }
}

/// Append-only record of every observation of one analysis run
///
/// Safe to append from the controller and from measurement workers.
#[derive(Debug, Default)]
pub struct MeasurementTable {
    entries: Mutex<BTreeMap<u64, Vec<Option<f64>>>>,
}

impl MeasurementTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, Vec<Option<f64>>>> {
        // A panicking appender cannot leave a half-written entry behind
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one trial
    pub fn add_time(&self, size: u64, elapsed_ms: Option<f64>) {
        self.lock().entry(size).or_default().push(elapsed_ms);
    }

    /// Record one observation
    pub fn record(&self, observation: Observation) {
        self.add_time(observation.size, observation.elapsed_ms);
    }

    /// Every recorded trial for a size
    #[must_use]
    pub fn observations(&self, size: u64) -> Vec<Option<f64>> {
        self.lock().get(&size).cloned().unwrap_or_default()
    }

    /// Average of the present trials for a size; `None` if none are present
    #[must_use]
    pub fn average(&self, size: u64) -> Option<f64> {
        self.lock().get(&size).and_then(|times| mean_present(times))
    }

    /// Averages for every recorded size
    #[must_use]
    pub fn averages(&self) -> BTreeMap<u64, Option<f64>> {
        self.lock()
            .iter()
            .map(|(size, times)| (*size, mean_present(times)))
            .collect()
    }

    /// Sizes and average times in ascending size order, skipping sizes with no time
    #[must_use]
    pub fn dataset(&self) -> (Vec<f64>, Vec<f64>) {
        self.averages()
            .into_iter()
            .filter_map(|(size, avg)| avg.map(|t| (size as f64, t)))
            .unzip()
    }

    /// Copy of the raw table
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<u64, Vec<Option<f64>>> {
        self.lock().clone()
    }

    /// Number of absent trials across all sizes
    #[must_use]
    pub fn absent_count(&self) -> usize {
        self.lock()
            .values()
            .map(|times| times.iter().filter(|t| t.is_none()).count())
            .sum()
    }

    /// Number of distinct sizes recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Average elapsed time of the present observations in a batch
#[must_use]
pub fn mean_elapsed(observations: &[Observation]) -> Option<f64> {
    let times: Vec<Option<f64>> = observations.iter().map(|o| o.elapsed_ms).collect();
    mean_present(&times)
}

fn mean_present(times: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = times.iter().filter_map(|t| *t).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}
