// ==========================================
// CAERS Core - Logging Setup
// ==========================================
// tracing-subscriber, level from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Human-readable logging for an embedding host
///
/// # Environment
/// - RUST_LOG: filter directive (default: info),
///   e.g. `RUST_LOG=caers_core::validation=debug`
///
/// # Example
/// ```no_run
/// use caers_core::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// One JSON object per event, for log shipping
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(false)
        .init();
}

/// Debug level into the test harness writer; safe to call repeatedly
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
