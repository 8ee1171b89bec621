//! Logging setup
//!
//! The behavior layer only emits `tracing` events; hosts decide whether
//! anything is listening. `init` installs a formatted stderr subscriber
//! filtered by `FOLIO_LOG` (default `info`).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "FOLIO_LOG";

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init() -> bool {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
