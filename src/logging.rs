// ==========================================
// Logging initialization
// ==========================================
// tracing + tracing-subscriber, level from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
///
/// # Environment
/// - RUST_LOG: filter directives (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=ncip_import::importer=trace
///
/// # Example
/// ```no_run
/// use ncip_import::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Filter used by `init_test` when RUST_LOG is unset: crate at debug, dependencies quiet.
pub const TEST_LOG_FILTER: &str = "warn,ncip_import=debug";

/// Subscriber writing through the test harness; safe to call repeatedly.
pub fn init_test() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(TEST_LOG_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_is_repeatable() {
        assert!(EnvFilter::try_new(TEST_LOG_FILTER).is_ok());
        init_test();
        init_test();
    }
}
