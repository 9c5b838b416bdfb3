//! # Observability Infrastructure
//!
//! Structured logging for the composer using the tracing ecosystem.
//! Composer operations emit events at their boundaries (rule install,
//! domain bind, gateway build); this module wires the subscriber.

use crate::config::LogSettings;
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Initialize structured logging.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the configured
/// filter directive. Safe to call once per process; a second call returns
/// a settings error from the underlying subscriber.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| Error::settings(format!("invalid log filter '{}': {}", settings.level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| Error::settings(format!("failed to initialize logging: {}", e)))?;

    tracing::info!(
        filter = %settings.level,
        json = settings.json,
        "logging initialized"
    );
    Ok(())
}
