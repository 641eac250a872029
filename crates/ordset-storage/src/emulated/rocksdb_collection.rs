//! RocksDB row collection.
//!
//! All ordered sets share one column family. Each row is stored as:
//!
//! | Part | Encoding |
//! |------|----------|
//! | key | `[key_len: u32 BE][key bytes][member bytes]` |
//! | value | score as `f64` big-endian bytes |
//!
//! The length prefix makes `[key_len][key]` an exact prefix for one set, so a
//! set is one forward scan, visited in member byte order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode,
    Options, WriteBatch, DB,
};
use tracing::{debug, info};

use ordset_core::error::{OrdSetError, OrdSetResult};
use ordset_core::types::Entry;

use super::collection::RowCollection;
use super::pipeline::{Document, Pipeline};
use super::row::RowFilter;
use crate::error::StorageError;

/// Column family holding every row.
pub const CF_SORTED_ROWS: &str = "sorted_rows";

/// Options for the row column family: shared cache, bloom filter, LZ4.
fn row_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts.create_if_missing(true);
    opts
}

fn key_prefix(key: &str) -> Vec<u8> {
    let len = u32::try_from(key.len()).unwrap_or(u32::MAX);
    let mut buf = Vec::with_capacity(4 + key.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(key.as_bytes());
    buf
}

fn encode_row_key(key: &str, member: &str) -> Vec<u8> {
    let mut buf = key_prefix(key);
    buf.extend_from_slice(member.as_bytes());
    buf
}

fn corrupted(details: impl Into<String>) -> StorageError {
    StorageError::Corrupted {
        cf: CF_SORTED_ROWS.to_string(),
        details: details.into(),
    }
}

fn decode_row_key(raw: &[u8]) -> Result<(String, String), StorageError> {
    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| corrupted("row key shorter than its length prefix"))?;
    let key_len = u32::from_be_bytes(len_bytes) as usize;
    let key_end = 4 + key_len;
    let key = raw
        .get(4..key_end)
        .ok_or_else(|| corrupted("row key truncated"))?;
    let member = &raw[key_end..];
    let key = std::str::from_utf8(key).map_err(|e| corrupted(e.to_string()))?;
    let member = std::str::from_utf8(member).map_err(|e| corrupted(e.to_string()))?;
    Ok((key.to_string(), member.to_string()))
}

fn decode_score(raw: &[u8]) -> Result<f64, StorageError> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| corrupted(format!("score has {} bytes, expected 8", raw.len())))?;
    Ok(f64::from_be_bytes(bytes))
}

fn rows_cf(db: &DB) -> Result<&ColumnFamily, StorageError> {
    db.cf_handle(CF_SORTED_ROWS)
        .ok_or_else(|| StorageError::ColumnFamilyNotFound {
            name: CF_SORTED_ROWS.to_string(),
        })
}

/// Rows admitted by `filter` from one snapshot, in key order then member
/// order.
fn scan(db: &DB, filter: &RowFilter) -> Result<Vec<Entry>, StorageError> {
    let cf = rows_cf(db)?;
    let snapshot = db.snapshot();
    let mut out = Vec::new();

    for key in filter.key_list() {
        let prefix = key_prefix(key);
        let iter = snapshot.iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (raw_key, raw_value) = item.map_err(|e| StorageError::ReadFailed(e.to_string()))?;
            if !raw_key.starts_with(&prefix) {
                break;
            }
            let (_, member) = decode_row_key(&raw_key)?;
            let score = decode_score(&raw_value)?;
            if filter.admits(&member, score) {
                out.push(Entry::new(key.clone(), member, score));
            }
        }
    }
    Ok(out)
}

/// Row collection persisted in RocksDB.
///
/// `DB` is internally synchronized; blocking I/O runs on Tokio's blocking
/// pool.
pub struct RocksDbRowCollection {
    db: Arc<DB>,
    /// Kept alive for the database lifetime.
    #[allow(dead_code)]
    cache: Cache,
    path: PathBuf,
}

impl std::fmt::Debug for RocksDbRowCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbRowCollection")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RocksDbRowCollection {
    /// Open (creating if needed) the collection at `path`.
    ///
    /// # Errors
    ///
    /// `StorageError::OpenFailed` if the directory cannot be opened, for
    /// instance because another process holds its lock.
    pub fn open(path: impl AsRef<Path>, block_cache_mb: usize) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let cache = Cache::new_lru_cache(block_cache_mb.max(1) * 1024 * 1024);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let descriptors = vec![ColumnFamilyDescriptor::new(
            CF_SORTED_ROWS,
            row_options(&cache),
        )];
        let db = DB::open_cf_descriptors(&db_opts, &path, descriptors).map_err(|e| {
            StorageError::OpenFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        info!(path = %path.display(), block_cache_mb, "Opened RocksDB row collection");
        Ok(Self {
            db: Arc::new(db),
            cache,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the database on the blocking pool.
    async fn blocking<T, F>(&self, operation: &'static str, f: F) -> OrdSetResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&DB) -> Result<T, StorageError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                OrdSetError::operation_failed(operation, format!("spawn_blocking failed: {e}"))
            })?;
        Ok(result?)
    }
}

#[async_trait]
impl RowCollection for RocksDbRowCollection {
    async fn upsert_many(&self, rows: Vec<Entry>) -> OrdSetResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.blocking("upsert_many", move |db| {
            let cf = rows_cf(db)?;
            // Last score wins for a row named twice in one call.
            let unique: BTreeMap<Vec<u8>, f64> = rows
                .iter()
                .map(|row| (encode_row_key(&row.key, &row.member), row.score))
                .collect();
            let mut batch = WriteBatch::default();
            let mut inserted = 0u64;
            for (key, score) in &unique {
                let exists = db
                    .get_pinned_cf(cf, key)
                    .map_err(|e| StorageError::ReadFailed(e.to_string()))?
                    .is_some();
                if !exists {
                    inserted += 1;
                }
                batch.put_cf(cf, key, score.to_be_bytes());
            }
            db.write(batch)
                .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
            Ok(inserted)
        })
        .await
    }

    async fn delete_many(&self, filter: RowFilter) -> OrdSetResult<u64> {
        let deleted = self
            .blocking("delete_many", move |db| {
                let doomed = scan(db, &filter)?;
                if doomed.is_empty() {
                    return Ok(0);
                }
                let cf = rows_cf(db)?;
                let mut batch = WriteBatch::default();
                for row in &doomed {
                    batch.delete_cf(cf, encode_row_key(&row.key, &row.member));
                }
                db.write(batch)
                    .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
                Ok(doomed.len() as u64)
            })
            .await?;
        debug!(deleted, "delete_many");
        Ok(deleted)
    }

    async fn aggregate(&self, pipeline: Pipeline) -> OrdSetResult<Vec<Document>> {
        let filter = pipeline.source().clone();
        let rows = self.blocking("aggregate", move |db| scan(db, &filter)).await?;
        pipeline.evaluate(rows.into_iter().map(Document::from).collect())
    }
}
