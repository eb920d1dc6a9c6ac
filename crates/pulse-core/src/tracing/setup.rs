//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Pulse tracing/logging system.
///
/// Reads the `PULSE_LOG` environment variable for per-subsystem log levels.
/// Format: `PULSE_LOG=deriver=debug,scoring=info,storage=warn`
///
/// Falls back to `pulse=info` if `PULSE_LOG` is not set or is invalid.
///
/// This function is idempotent; calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("PULSE_LOG").unwrap_or_else(|_| EnvFilter::new("pulse=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
