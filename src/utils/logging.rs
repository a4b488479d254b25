//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays parseable.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` when verbose).
/// Calling this twice is harmless.
pub fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},ort=warn,hyper=warn")));

    let result = if json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(verbose)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_multiple_calls() {
        init_tracing(false, false);
        init_tracing(true, true);
    }
}
