//! Timed measurement of a target function
//!
//! - [`Invocation`]: the capability to run the target once at a size
//! - [`MeasurementTable`]: append-only record of every observation
//! - [`SampleAggregator`]: repeated trials, averaging, timeout-bounded workers

mod aggregator;
mod cancel;
mod invoke;
mod table;

pub use aggregator::SampleAggregator;
pub use cancel::CancelToken;
pub use invoke::{FnInvocation, Invocation, InvocationError};
pub use table::{mean_elapsed, MeasurementTable, Observation};
