//! Tracing subscriber initialisation.

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`; when that is unset nothing below
/// `ERROR` is emitted. Safe to call more than once: a subscriber that is
/// already installed (by a test harness, say) wins and the attempt is
/// logged rather than treated as fatal.
pub fn init() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    if let Err(error) = result {
        warn!(%error, "tracing subscriber already installed");
    }
}
