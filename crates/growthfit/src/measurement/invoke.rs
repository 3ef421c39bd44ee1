use super::cancel::CancelToken;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use thiserror::Error;

/// Why a single trial produced no measurement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The trial exceeded its own time limit or was cancelled
    #[error("invocation timed out")]
    TimedOut,
    /// The target failed (panicked, crashed, exited non-zero)
    #[error("invocation failed: {0}")]
    Failed(String),
}

/// Run the target once at a given input size and report elapsed milliseconds
///
/// Implementations must leave no state behind that changes later trials, and
/// should honour `cancel` where they can.
pub trait Invocation: Send + Sync {
    /// Execute one trial
    fn invoke(&self, size: u64, cancel: &CancelToken) -> Result<f64, InvocationError>;
}

impl<T: Invocation + ?Sized> Invocation for std::sync::Arc<T> {
    fn invoke(&self, size: u64, cancel: &CancelToken) -> Result<f64, InvocationError> {
        (**self).invoke(size, cancel)
    }
}

/// In-process target: a closure timed with a monotonic clock
///
/// Panics inside the closure are reported as [`InvocationError::Failed`].
pub struct FnInvocation<F> {
    target: F,
}

impl<F> FnInvocation<F>
where
    F: Fn(u64) + Send + Sync,
{
    /// Wrap a closure taking the input size
    pub fn new(target: F) -> Self {
        Self { target }
    }
}

impl<F> std::fmt::Debug for FnInvocation<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnInvocation").finish_non_exhaustive()
    }
}

impl<F> Invocation for FnInvocation<F>
where
    F: Fn(u64) + Send + Sync,
{
    fn invoke(&self, size: u64, cancel: &CancelToken) -> Result<f64, InvocationError> {
        if cancel.is_cancelled() {
            return Err(InvocationError::TimedOut);
        }
        let start = Instant::now();
        catch_unwind(AssertUnwindSafe(|| (self.target)(size))).map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "target panicked".to_string());
            InvocationError::Failed(message)
        })?;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fn_invocation_measures_time() {
        let invocation = FnInvocation::new(|_| std::thread::sleep(Duration::from_millis(5)));
        let elapsed = invocation.invoke(1, &CancelToken::new()).unwrap();
        assert!(elapsed >= 5.0, "elapsed {elapsed}");
    }

    #[test]
    fn test_fn_invocation_passes_size() {
        let seen = std::sync::Mutex::new(Vec::new());
        let invocation = FnInvocation::new(|n| seen.lock().unwrap().push(n));
        invocation.invoke(42, &CancelToken::new()).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![42]);
    }

    #[test]
    fn test_panic_becomes_failure() {
        let invocation = FnInvocation::new(|n| {
            assert!(n < 10, "size too large");
        });
        let err = invocation.invoke(11, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, InvocationError::Failed(ref m) if m.contains("size too large")));
    }

    #[test]
    fn test_cancelled_token_skips_trial() {
        let token = CancelToken::new();
        token.cancel();
        let invocation = FnInvocation::new(|_| {});
        assert_eq!(
            invocation.invoke(1, &token).unwrap_err(),
            InvocationError::TimedOut
        );
    }
}
