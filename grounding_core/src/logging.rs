//! Tracing setup for the `grounded` binary.
//!
//! Session prompts own stdout, so every event goes to stderr. The default
//! filter is `warn`: a normal run prints nothing but the exercise itself,
//! while journal problems (skipped lines, failed writes) still show up.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_LEVEL: &str = "warn";

/// Install the subscriber with the `warn` default
pub fn init() {
    init_with_level(DEFAULT_LEVEL)
}

/// Install the subscriber with `default_level` (e.g. "debug" for `--verbose`)
///
/// RUST_LOG, when set, wins over `default_level`.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
