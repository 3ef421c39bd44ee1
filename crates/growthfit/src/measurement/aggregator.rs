use super::cancel::CancelToken;
use super::invoke::Invocation;
use super::table::{MeasurementTable, Observation};
use crate::result::{GrowthError, GrowthResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Repeats trials of one invocation and records them in a shared table
pub struct SampleAggregator {
    invocation: Arc<dyn Invocation>,
    table: Arc<MeasurementTable>,
    // One permit: a batch's worker holds it until the worker returns
    worker_slot: Arc<Semaphore>,
}

impl std::fmt::Debug for SampleAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleAggregator")
            .field("sizes", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl SampleAggregator {
    /// Create an aggregator with a fresh measurement table
    pub fn new(invocation: impl Invocation + 'static) -> Self {
        Self::with_table(Arc::new(invocation), Arc::new(MeasurementTable::new()))
    }

    /// Create an aggregator recording into an existing table
    #[must_use]
    pub fn with_table(invocation: Arc<dyn Invocation>, table: Arc<MeasurementTable>) -> Self {
        Self {
            invocation,
            table,
            worker_slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// The table every observation is appended to
    #[must_use]
    pub fn table(&self) -> &Arc<MeasurementTable> {
        &self.table
    }

    /// Run `repeats` trials at `size` on the current thread
    pub fn measure(&self, size: u64, repeats: usize) -> Vec<Observation> {
        run_trials(
            self.invocation.as_ref(),
            &self.table,
            size,
            repeats,
            &CancelToken::new(),
        )
    }

    /// Average of the recorded trials for `size`
    #[must_use]
    pub fn average(&self, size: u64) -> Option<f64> {
        self.table.average(size)
    }

    /// Run `repeats` trials at `size` on a blocking worker, waiting at most `budget`
    ///
    /// On timeout the worker is asked to stop, one absent observation is
    /// recorded for the size and [`GrowthError::MeasurementTimeout`] is returned.
    ///
    /// Batches never overlap. Waiting for a worker left over from a timed-out
    /// batch counts against `budget`.
    pub async fn measure_within(
        &self,
        size: u64,
        repeats: usize,
        budget: Duration,
    ) -> GrowthResult<Vec<Observation>> {
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let invocation = Arc::clone(&self.invocation);
        let table = Arc::clone(&self.table);
        let worker_slot = Arc::clone(&self.worker_slot);

        let batch = async move {
            let permit = worker_slot
                .acquire_owned()
                .await
                .map_err(|e| e.to_string())?;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                run_trials(invocation.as_ref(), &table, size, repeats, &worker_cancel)
            })
            .await
            .map_err(|e| e.to_string())
        };

        match tokio::time::timeout(budget, batch).await {
            Ok(Ok(observations)) => Ok(observations),
            Ok(Err(message)) => {
                self.table.add_time(size, None);
                Err(GrowthError::Worker { message })
            }
            Err(_) => {
                cancel.cancel();
                self.table.add_time(size, None);
                let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
                warn!(size, budget_ms, "measurement timed out");
                Err(GrowthError::MeasurementTimeout { size, budget_ms })
            }
        }
    }
}

fn run_trials(
    invocation: &dyn Invocation,
    table: &MeasurementTable,
    size: u64,
    repeats: usize,
    cancel: &CancelToken,
) -> Vec<Observation> {
    let mut observations = Vec::with_capacity(repeats);
    for _ in 0..repeats {
        if cancel.is_cancelled() {
            break;
        }
        let result = invocation.invoke(size, cancel);
        if cancel.is_cancelled() {
            // The controller already recorded this batch as timed out
            break;
        }
        let observation = match result {
            Ok(elapsed_ms) => {
                debug!(size, elapsed_ms, "trial finished");
                Observation::timed(size, elapsed_ms)
            }
            Err(e) => {
                debug!(size, error = %e, "trial produced no measurement");
                Observation::absent(size)
            }
        };
        table.record(observation);
        observations.push(observation);
    }
    observations
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::measurement::{FnInvocation, InvocationError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports `size` milliseconds without sleeping
    struct EchoSize;

    impl Invocation for EchoSize {
        fn invoke(&self, size: u64, _cancel: &CancelToken) -> Result<f64, InvocationError> {
            Ok(size as f64)
        }
    }

    /// Fails for odd sizes
    struct FailOdd;

    impl Invocation for FailOdd {
        fn invoke(&self, size: u64, _cancel: &CancelToken) -> Result<f64, InvocationError> {
            if size % 2 == 1 {
                Err(InvocationError::Failed("odd".into()))
            } else {
                Ok(1.0)
            }
        }
    }

    /// Sleeps per trial and tracks the most trials running at once
    struct Overlap {
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        sleep: Duration,
    }

    impl Invocation for Overlap {
        fn invoke(&self, _size: u64, _cancel: &CancelToken) -> Result<f64, InvocationError> {
            let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            std::thread::sleep(self.sleep);
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(1.0)
        }
    }

    mod measure_tests {
        use super::*;

        #[test]
        fn test_measure_records_every_trial() {
            let aggregator = SampleAggregator::new(EchoSize);
            let observations = aggregator.measure(12, 3);
            assert_eq!(observations.len(), 3);
            assert_eq!(aggregator.table().observations(12).len(), 3);
            assert_eq!(aggregator.average(12), Some(12.0));
        }

        #[test]
        fn test_failures_become_absent() {
            let aggregator = SampleAggregator::new(FailOdd);
            let observations = aggregator.measure(3, 2);
            assert!(observations.iter().all(|o| !o.is_present()));
            assert_eq!(aggregator.table().observations(3), vec![None, None]);
            assert_eq!(aggregator.average(3), None);
        }

        #[test]
        fn test_shared_table() {
            let table = Arc::new(MeasurementTable::new());
            let first = SampleAggregator::with_table(Arc::new(EchoSize), Arc::clone(&table));
            let second = SampleAggregator::with_table(Arc::new(FailOdd), Arc::clone(&table));
            first.measure(2, 1);
            second.measure(2, 1);
            assert_eq!(table.observations(2), vec![Some(2.0), Some(1.0)]);
        }
    }

    mod timeout_tests {
        use super::*;

        #[tokio::test]
        async fn test_measure_within_budget() {
            let aggregator = SampleAggregator::new(EchoSize);
            let observations = aggregator
                .measure_within(5, 2, Duration::from_secs(5))
                .await
                .unwrap();
            assert_eq!(observations.len(), 2);
            assert_eq!(aggregator.average(5), Some(5.0));
        }

        #[tokio::test]
        async fn test_timeout_records_absent() {
            let aggregator = SampleAggregator::new(FnInvocation::new(|_| {
                std::thread::sleep(Duration::from_millis(300));
            }));
            let err = aggregator
                .measure_within(9, 2, Duration::from_millis(20))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                GrowthError::MeasurementTimeout {
                    size: 9,
                    budget_ms: 20
                }
            ));
            assert_eq!(aggregator.table().observations(9), vec![None]);
        }

        #[tokio::test]
        async fn test_timed_out_worker_stops_recording() {
            let aggregator = SampleAggregator::new(FnInvocation::new(|_| {
                std::thread::sleep(Duration::from_millis(50));
            }));
            let _ = aggregator
                .measure_within(1, 5, Duration::from_millis(10))
                .await;
            tokio::time::sleep(Duration::from_millis(150)).await;
            assert_eq!(aggregator.table().observations(1), vec![None]);
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn test_batches_never_overlap() {
            let active = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let aggregator = SampleAggregator::new(Overlap {
                active: Arc::clone(&active),
                peak: Arc::clone(&peak),
                sleep: Duration::from_millis(100),
            });

            let first = aggregator
                .measure_within(4, 3, Duration::from_millis(20))
                .await;
            assert!(matches!(first, Err(GrowthError::MeasurementTimeout { .. })));
            let second = aggregator
                .measure_within(5, 2, Duration::from_secs(5))
                .await
                .unwrap();

            assert_eq!(second.len(), 2);
            assert_eq!(peak.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_stuck_worker_times_out_next_batch() {
            let aggregator = SampleAggregator::new(FnInvocation::new(|_| {
                std::thread::sleep(Duration::from_millis(400));
            }));
            let _ = aggregator
                .measure_within(6, 1, Duration::from_millis(20))
                .await;
            let err = aggregator
                .measure_within(7, 1, Duration::from_millis(50))
                .await
                .unwrap_err();
            assert!(matches!(err, GrowthError::MeasurementTimeout { size: 7, .. }));
            assert_eq!(aggregator.table().observations(7), vec![None]);
        }
    }
}
