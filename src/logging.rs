//! Diagnostic tracing, written to stderr so report output on stdout stays clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `warn`, or `info` for
/// scout's own events when `verbose` is on.
///
/// ```bash
/// RUST_LOG=scout=debug scout "how do solid-state batteries work"
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,scout=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
