//! In-memory row collection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use ordset_core::error::OrdSetResult;
use ordset_core::types::Entry;

use super::collection::RowCollection;
use super::pipeline::{Document, Pipeline};
use super::row::RowFilter;
use crate::error::StorageError;

type RowMap = BTreeMap<(String, String), f64>;

/// Row collection kept in a `(key, member)`-ordered map.
#[derive(Debug, Default)]
pub struct InMemoryRowCollection {
    rows: RwLock<RowMap>,
    closed: AtomicBool,
}

impl InMemoryRowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every further call with `StoreUnavailable`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Total number of rows across all sets.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

/// Rows admitted by `filter`, in key order then member order.
fn scan(rows: &RowMap, filter: &RowFilter) -> Vec<Entry> {
    let mut out = Vec::new();
    for key in filter.key_list() {
        let start = (key.clone(), String::new());
        for ((k, member), score) in rows.range(start..) {
            if k != key {
                break;
            }
            if filter.admits(member, *score) {
                out.push(Entry::new(k.clone(), member.clone(), *score));
            }
        }
    }
    out
}

#[async_trait]
impl RowCollection for InMemoryRowCollection {
    async fn upsert_many(&self, rows: Vec<Entry>) -> OrdSetResult<u64> {
        self.ensure_open()?;
        let mut map = self.rows.write();
        let inserted = rows
            .into_iter()
            .filter(|row| map.insert((row.key.clone(), row.member.clone()), row.score).is_none())
            .count();
        Ok(inserted as u64)
    }

    async fn delete_many(&self, filter: RowFilter) -> OrdSetResult<u64> {
        self.ensure_open()?;
        let mut map = self.rows.write();
        let doomed = scan(&map, &filter);
        for row in &doomed {
            map.remove(&(row.key.clone(), row.member.clone()));
        }
        trace!(deleted = doomed.len(), "delete_many");
        Ok(doomed.len() as u64)
    }

    async fn aggregate(&self, pipeline: Pipeline) -> OrdSetResult<Vec<Document>> {
        self.ensure_open()?;
        let docs: Vec<Document> = {
            let map = self.rows.read();
            scan(&map, pipeline.source())
                .into_iter()
                .map(Document::from)
                .collect()
        };
        trace!(rows = docs.len(), stages = pipeline.stages().len(), "aggregate");
        pipeline.evaluate(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordset_core::types::ScoreRange;

    async fn seeded() -> InMemoryRowCollection {
        let collection = InMemoryRowCollection::new();
        collection
            .upsert_many(vec![
                Entry::new("a", "x", 1.0),
                Entry::new("a", "y", 2.0),
                Entry::new("ab", "x", 3.0),
                Entry::new("b", "x", 4.0),
            ])
            .await
            .unwrap();
        collection
    }

    #[tokio::test]
    async fn test_scan_stays_within_key() {
        let collection = seeded().await;
        let docs = collection
            .aggregate(Pipeline::matching(RowFilter::key("a")))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.key.as_deref() == Some("a")));
    }

    #[tokio::test]
    async fn test_rows_follow_filter_key_order() {
        let collection = seeded().await;
        let docs = collection
            .aggregate(Pipeline::matching(RowFilter::keys(["b", "a"])))
            .await
            .unwrap();
        let keys: Vec<_> = docs.iter().filter_map(|d| d.key.clone()).collect();
        assert_eq!(keys, vec!["b", "a", "a"]);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let collection = seeded().await;
        let inserted = collection
            .upsert_many(vec![Entry::new("a", "x", 9.0), Entry::new("c", "z", 0.0)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(collection.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_many_by_score() {
        let collection = seeded().await;
        let deleted = collection
            .delete_many(RowFilter::keys(["a", "b"]).score(ScoreRange::from_f64(2.0, 4.0).unwrap()))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(collection.len(), 2);
    }

    #[tokio::test]
    async fn test_closed_collection_is_unavailable() {
        let collection = seeded().await;
        collection.close();
        let err = collection.delete_many(RowFilter::key("a")).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
