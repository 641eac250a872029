//! Key/value object store used for metadata records.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::OrdSetResult;

/// Field map of one stored object.
pub type ObjectFields = Map<String, Value>;

/// Hash-object storage living next to the ordered sets.
///
/// Counters and records (for instance `global.nextEid` and `event:<eid>`)
/// are kept here; the ordered sets only index them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read one field of one object.
    async fn get_object_field(&self, key: &str, field: &str) -> OrdSetResult<Option<Value>>;

    /// Merge `fields` into the object at `key`, creating it if needed.
    async fn set_object(&self, key: &str, fields: ObjectFields) -> OrdSetResult<()>;

    /// Read whole objects, `None` for missing keys, in request order.
    async fn get_objects(&self, keys: &[String]) -> OrdSetResult<Vec<Option<ObjectFields>>>;

    /// Read selected fields of many objects, in request order.
    ///
    /// Missing objects and fields come back as `null` values.
    async fn get_objects_fields(
        &self,
        keys: &[String],
        fields: &[&str],
    ) -> OrdSetResult<Vec<ObjectFields>>;

    /// Increment an integer field by one and return the new value.
    async fn incr_object_field(&self, key: &str, field: &str) -> OrdSetResult<i64>;

    /// Delete whole objects.
    async fn delete_all(&self, keys: &[String]) -> OrdSetResult<()>;
}
