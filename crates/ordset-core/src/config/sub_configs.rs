//! Sub-configuration structures.
//!
//! This module contains the individual configuration structs that make up
//! the main `Config` structure.

use serde::{Deserialize, Serialize};

use crate::error::{OrdSetError, OrdSetResult};
use crate::traits::BackendKind;

/// Storage engine underneath a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// In-process, non-persistent.
    #[default]
    Memory,
    /// RocksDB on local disk (emulated backend only).
    Rocksdb,
}

/// Storage configuration: which backend to bind and where it keeps data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Backend family bound at startup: "native" or "emulated"
    #[serde(default)]
    pub backend: BackendKind,

    /// Engine: "memory" or "rocksdb"
    #[serde(default)]
    pub engine: EngineKind,

    /// Database directory, used by the rocksdb engine
    #[serde(default = "default_path")]
    pub path: String,

    /// RocksDB block cache size in megabytes (default: 64)
    #[serde(default = "default_block_cache_mb")]
    pub block_cache_mb: usize,
}

fn default_path() -> String {
    "./data/ordset".to_string()
}

fn default_block_cache_mb() -> usize {
    64
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            engine: EngineKind::default(),
            path: default_path(),
            block_cache_mb: default_block_cache_mb(),
        }
    }
}

impl StorageConfig {
    /// Emulated backend over a RocksDB row collection at `path`.
    pub fn rocksdb(path: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Emulated,
            engine: EngineKind::Rocksdb,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Validate the backend/engine combination.
    pub fn validate(&self) -> OrdSetResult<()> {
        if self.backend == BackendKind::Native && self.engine == EngineKind::Rocksdb {
            return Err(OrdSetError::ConfigError(
                "storage.engine = \"rocksdb\" requires storage.backend = \"emulated\"".into(),
            ));
        }
        if self.engine == EngineKind::Rocksdb {
            if self.path.trim().is_empty() {
                return Err(OrdSetError::ConfigError(
                    "storage.path must not be empty for the rocksdb engine".into(),
                ));
            }
            if self.block_cache_mb == 0 {
                return Err(OrdSetError::ConfigError(
                    "storage.block_cache_mb must be greater than 0".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub const FORMATS: &'static [&'static str] = &["pretty", "compact", "json"];

    pub fn validate(&self) -> OrdSetResult<()> {
        if !Self::FORMATS.contains(&self.format.as_str()) {
            return Err(OrdSetError::ConfigError(format!(
                "logging.format must be one of {:?}, got '{}'",
                Self::FORMATS,
                self.format
            )));
        }
        if self.level.trim().is_empty() {
            return Err(OrdSetError::ConfigError(
                "logging.level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Paging used when draining sets page by page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Members per page (default: 100)
    #[serde(default = "default_batch_size")]
    pub size: usize,

    /// Pause between pages in milliseconds (default: 0)
    #[serde(default)]
    pub interval_ms: u64,
}

fn default_batch_size() -> usize {
    100
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
            interval_ms: 0,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> OrdSetResult<()> {
        if self.size == 0 {
            return Err(OrdSetError::ConfigError(
                "batch.size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
