//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{OrdSetError, OrdSetResult};

/// Install the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Calling this again after
/// a subscriber is installed is a no-op.
///
/// # Errors
///
/// `ConfigError` if the level is not a valid filter directive or the format
/// is unknown.
pub fn init(config: &LoggingConfig) -> OrdSetResult<()> {
    config.validate()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            OrdSetError::ConfigError(format!("invalid logging.level '{}': {}", config.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(true);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already installed; keeping it");
    }
    Ok(())
}
