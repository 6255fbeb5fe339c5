//! Tracing subscriber setup for the binary. Library code only emits events.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr so stdout stays machine-readable.
///
/// `RUST_LOG` sets the filter (default: `info`), e.g. `RUST_LOG=groupdraw=trace` to see every pick.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Verbose logging for tests, captured by the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
