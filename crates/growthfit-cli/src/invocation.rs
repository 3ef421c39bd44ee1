//! Timing an external command

use crate::error::{CliError, CliResult};
use growthfit::{CancelToken, Invocation, InvocationError};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Placeholder replaced by the input size in every argument
pub const SIZE_PLACEHOLDER: &str = "{n}";

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs a command once per trial and reports its wall-clock time
///
/// The child is polled so that a cancelled trial kills it instead of
/// leaving it running after the timeout.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
}

impl CommandInvocation {
    /// Build from `program arg..`
    pub fn new(command: &[String]) -> CliResult<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CliError::invalid_argument("no command given"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Arguments for one size
    #[must_use]
    pub fn args_for(&self, size: u64) -> Vec<String> {
        let size = size.to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(SIZE_PLACEHOLDER, &size))
            .collect()
    }
}

impl Invocation for CommandInvocation {
    fn invoke(&self, size: u64, cancel: &CancelToken) -> Result<f64, InvocationError> {
        if cancel.is_cancelled() {
            return Err(InvocationError::TimedOut);
        }
        let args = self.args_for(size);
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| InvocationError::Failed(format!("{}: {e}", self.program)))?;

        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => {
                    return Ok(start.elapsed().as_secs_f64() * 1000.0);
                }
                Ok(Some(status)) => {
                    return Err(InvocationError::Failed(format!(
                        "{} exited with {status}",
                        self.program
                    )));
                }
                Ok(None) if cancel.is_cancelled() => {
                    debug!(size, pid = child.id(), "killing cancelled trial");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(InvocationError::TimedOut);
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(InvocationError::Failed(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn command(parts: &[&str]) -> CommandInvocation {
        let parts: Vec<String> = parts.iter().map(ToString::to_string).collect();
        CommandInvocation::new(&parts).unwrap()
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandInvocation::new(&[]).is_err());
    }

    #[test]
    fn test_size_substitution() {
        let inv = command(&["seq", "{n}", "--limit={n}", "plain"]);
        assert_eq!(inv.args_for(42), vec!["42", "--limit=42", "plain"]);
    }

    #[test]
    fn test_missing_program_fails() {
        let inv = command(&["growthfit-no-such-program-xyz"]);
        let err = inv.invoke(1, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, InvocationError::Failed(_)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let inv = command(&["true"]);
        assert_eq!(inv.invoke(1, &cancel), Err(InvocationError::TimedOut));
    }

    #[cfg(unix)]
    mod unix_tests {
        use super::*;

        #[test]
        fn test_success_is_timed() {
            let elapsed = command(&["true"]).invoke(1, &CancelToken::new()).unwrap();
            assert!(elapsed >= 0.0);
        }

        #[test]
        fn test_nonzero_exit_fails() {
            let err = command(&["false"]).invoke(1, &CancelToken::new()).unwrap_err();
            assert!(matches!(err, InvocationError::Failed(msg) if msg.contains("false")));
        }

        #[test]
        fn test_size_reaches_child() {
            let inv = command(&["sh", "-c", "test {n} -eq 7"]);
            assert!(inv.invoke(7, &CancelToken::new()).is_ok());
            assert!(inv.invoke(8, &CancelToken::new()).is_err());
        }

        #[test]
        fn test_cancel_kills_child() {
            let cancel = CancelToken::new();
            let trigger = cancel.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                trigger.cancel();
            });
            let start = Instant::now();
            let result = command(&["sleep", "10"]).invoke(1, &cancel);
            assert_eq!(result, Err(InvocationError::TimedOut));
            assert!(start.elapsed() < Duration::from_secs(5));
        }
    }
}
