//! Contract of the flat row collection behind the emulated backend.

use async_trait::async_trait;

use ordset_core::error::OrdSetResult;
use ordset_core::types::Entry;

use super::pipeline::{Document, Pipeline};
use super::row::RowFilter;

/// A document store holding every ordered set as `(key, member, score)`
/// rows, unique on `(key, member)`.
#[async_trait]
pub trait RowCollection: Send + Sync {
    /// Insert or overwrite rows. Returns the number of new rows.
    async fn upsert_many(&self, rows: Vec<Entry>) -> OrdSetResult<u64>;

    /// Delete every row the filter admits. Returns the number deleted.
    async fn delete_many(&self, filter: RowFilter) -> OrdSetResult<u64>;

    /// Run a pipeline over the rows its leading filter selects.
    ///
    /// Rows are fed in the filter's key order, and by member within a key.
    /// The whole pipeline sees one consistent snapshot.
    async fn aggregate(&self, pipeline: Pipeline) -> OrdSetResult<Vec<Document>>;
}
