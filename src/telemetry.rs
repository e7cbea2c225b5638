//! Logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "shop_unit_of_work=info,tower_http=info";

/// Installs the global `tracing` subscriber.
///
/// Verbosity follows `RUST_LOG` (for example `RUST_LOG=shop_unit_of_work=debug`)
/// and falls back to [`DEFAULT_FILTER`]. Calling it twice is a no-op.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
