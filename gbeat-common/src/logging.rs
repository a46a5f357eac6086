//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `configured` (from the TOML
/// `[logging] level`) and finally `fallback` are used as the filter.
pub fn init_tracing(configured: Option<&str>, fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(fallback)))
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is harmless, keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
