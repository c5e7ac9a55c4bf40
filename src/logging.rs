//! Log subscriber setup for the CLI.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! bridges those records and writes them to stderr.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Map the `-v` count to a level: warn, info, debug, then trace.
#[must_use]
pub const fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for_verbosity(verbose).into())
        .from_env_lossy();
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .is_err()
    {
        // A subscriber is already installed; keep it.
    }
}
