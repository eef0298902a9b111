//! Tracing subscriber setup.
//!
//! The engine only emits `tracing` events; front ends call one of these
//! once at startup to see them. Initialisation is idempotent: the first
//! call wins and later calls are ignored.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

static TRACING_INIT: Once = Once::new();

/// Install the fmt subscriber with `RUST_LOG`, falling back to `info`.
pub fn init_tracing_default() {
    init_tracing(DEFAULT_FILTER);
}

/// Install the fmt subscriber. `RUST_LOG` takes precedence over `filter`.
pub fn init_tracing(filter: &str) {
    let fallback = filter.to_string();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact();

        // Another global subscriber may already be installed.
        let _ = subscriber.try_init();
    });
}
