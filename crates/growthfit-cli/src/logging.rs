//! Log output on stderr
//!
//! `RUST_LOG` wins over the `-v`/`-q` flags when it is set.

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Filter for a verbosity level, unless `RUST_LOG` overrides it
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbosity: Verbosity, use_color: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(Verbosity::Quiet, false);
        init(Verbosity::Debug, false);
        tracing::info!("after init");
    }
}
