//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{AppError, AppResult};

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_filter`
/// (e.g. `"support=debug,sea_orm=info"`). With `json` set, events are
/// written as one JSON object per line.
pub fn init_tracing(default_filter: &str, json: bool) -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {e}")))
}
