//! Process-wide logging setup, shared by the server binary and tests.

/// Subscriber wiring (filter + JSON output).
pub mod tracing;

/// Install the global tracing subscriber.
///
/// Idempotent: the first caller wins and later calls do nothing, so tests
/// and the binary can both call it unconditionally.
pub fn init() {
    tracing::init();
}
