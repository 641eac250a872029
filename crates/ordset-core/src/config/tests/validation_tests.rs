//! Tests for configuration validation.

use crate::config::{Config, EngineKind};
use crate::traits::BackendKind;

#[test]
fn test_validation_passes() {
    let config = Config::default_config();
    assert!(config.validate().is_ok());
}

#[test]
fn test_native_backend_cannot_use_rocksdb() {
    let mut config = Config::default_config();
    config.storage.engine = EngineKind::Rocksdb;

    let err = config.validate().unwrap_err().to_string();
    assert!(
        err.contains("storage.engine"),
        "Error must mention storage.engine: {err}"
    );
}

#[test]
fn test_rocksdb_requires_path() {
    let mut config = Config::default_config();
    config.storage.backend = BackendKind::Emulated;
    config.storage.engine = EngineKind::Rocksdb;
    config.storage.path = "  ".into();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_batch_size_fails() {
    let mut config = Config::default_config();
    config.batch.size = 0;
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("batch.size"));
}

#[test]
fn test_unknown_log_format_fails() {
    let mut config = Config::default_config();
    config.logging.format = "xml".into();
    assert!(config.validate().is_err());
}
