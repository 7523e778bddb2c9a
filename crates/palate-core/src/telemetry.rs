//! Tracing subscriber setup for Palate binaries.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "PALATE_LOG";

/// Initialize the global tracing subscriber.
///
/// `PALATE_LOG` overrides `level` when set. When `json` is true events are
/// written as JSON lines. Calling this twice is harmless; the second call is
/// ignored.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()
            .ok();
    } else {
        registry.with(fmt::layer().with_target(false)).try_init().ok();
    }
}
