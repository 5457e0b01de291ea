//! Subscriber wiring.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Install a JSON-formatted subscriber filtered through `RUST_LOG`.
///
/// Guard decisions and identity operations log at `info`; turn a single
/// crate up with the usual syntax, e.g. `RUST_LOG=rolegate_api=debug`.
/// Registration fails quietly if a subscriber is already installed.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Same as [`init`], with an explicit fallback filter.
pub fn init_with_default(fallback: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
