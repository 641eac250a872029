//! Ordered-set storage backends.
//!
//! # Architecture
//! - `native`: ranked collections per key, driven by commands and batches
//! - `emulated`: flat `(key, member, score)` rows driven by pipelines, in
//!   memory or on RocksDB
//! - `factory`: binds exactly one backend from [`StorageConfig`]
//!
//! Both backends order by score then member, and share the score arithmetic
//! of `ordset_core::types`, so they answer every query identically.
//!
//! [`StorageConfig`]: ordset_core::config::StorageConfig

pub mod emulated;
pub mod error;
pub mod factory;
pub mod native;

pub use emulated::{
    EmulatedSortedSetBackend, InMemoryRowCollection, RocksDbRowCollection, RowCollection,
};
pub use error::StorageError;
pub use factory::{open_backend, open_sorted_sets};
pub use native::{InMemoryRankedStore, NativeSortedSetBackend, RankedStore, TEMP_KEY_PREFIX};
