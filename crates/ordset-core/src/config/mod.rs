//! Configuration management.

mod sub_configs;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::error::{OrdSetError, OrdSetResult};

pub use sub_configs::{BatchConfig, EngineKind, LoggingConfig, StorageConfig};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{ORDSET_ENV}.toml (environment-specific)
    /// 3. Environment variables with ORDSET__ prefix, e.g. `ORDSET__STORAGE__BACKEND=emulated`
    pub fn load() -> OrdSetResult<Self> {
        let env = std::env::var("ORDSET_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                ::config::Environment::with_prefix("ORDSET")
                    .prefix_separator("__")
                    .separator("__"),
            );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults for testing/development.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> OrdSetResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrdSetError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| OrdSetError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> OrdSetResult<()> {
        self.storage.validate()?;
        self.logging.validate()?;
        self.batch.validate()?;
        Ok(())
    }
}
