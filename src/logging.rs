//! Structured logging bootstrap via `tracing_subscriber`, without a file
//! appender: this crate is a library core, not a long-running daemon.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber reading `RUST_LOG`, defaulting to
/// `info`. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
