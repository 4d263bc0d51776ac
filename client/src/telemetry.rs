//! Tracing setup for hosts embedding the session.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "nightsync_client=info,nightsync_engine=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directives`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_directives: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
