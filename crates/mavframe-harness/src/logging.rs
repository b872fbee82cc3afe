//! Test log output.

use tracing_subscriber::EnvFilter;

/// Route `tracing` events to the test writer, filtered by `RUST_LOG`
/// (default `warn`). Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber installed by an earlier test in the same binary is kept.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
