//! Backend selection from configuration.

use std::sync::Arc;

use tracing::info;

use ordset_core::config::{EngineKind, StorageConfig};
use ordset_core::error::{OrdSetError, OrdSetResult};
use ordset_core::traits::{BackendKind, SortedSetBackend};
use ordset_core::SortedSets;

use crate::emulated::{EmulatedSortedSetBackend, InMemoryRowCollection, RocksDbRowCollection};
use crate::native::{InMemoryRankedStore, NativeSortedSetBackend};

/// Open the backend `config` names.
///
/// # Errors
///
/// `ConfigError` for an invalid combination; `StoreUnavailable` if the
/// RocksDB directory cannot be opened.
pub fn open_backend(config: &StorageConfig) -> OrdSetResult<Arc<dyn SortedSetBackend>> {
    config.validate()?;
    let backend: Arc<dyn SortedSetBackend> = match (config.backend, config.engine) {
        (BackendKind::Native, EngineKind::Memory) => Arc::new(NativeSortedSetBackend::new(
            Arc::new(InMemoryRankedStore::new()),
        )),
        (BackendKind::Emulated, EngineKind::Memory) => Arc::new(EmulatedSortedSetBackend::new(
            Arc::new(InMemoryRowCollection::new()),
        )),
        (BackendKind::Emulated, EngineKind::Rocksdb) => {
            let collection = RocksDbRowCollection::open(&config.path, config.block_cache_mb)?;
            Arc::new(EmulatedSortedSetBackend::new(Arc::new(collection)))
        }
        (BackendKind::Native, EngineKind::Rocksdb) => {
            return Err(OrdSetError::ConfigError(
                "the native backend has no rocksdb engine".into(),
            ))
        }
    };
    info!(backend = %config.backend, engine = ?config.engine, "Storage backend opened");
    Ok(backend)
}

/// Open the configured backend and bind a facade to it.
pub fn open_sorted_sets(config: &StorageConfig) -> OrdSetResult<SortedSets> {
    Ok(SortedSets::new(open_backend(config)?))
}
