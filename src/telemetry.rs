//! Tracing setup for hosts embedding the notes client

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,notehub=debug";

/// Install a global `tracing` subscriber (env filter + fmt layer).
///
/// Returns `false` if a global subscriber was already installed, which is
/// not an error for an embedded library.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
