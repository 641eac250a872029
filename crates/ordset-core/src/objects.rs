//! In-memory [`ObjectStore`].
//!
//! Non-persistent; everything is lost when the store is dropped. Used for
//! tests and for deployments whose object records live elsewhere.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::{OrdSetError, OrdSetResult};
use crate::traits::{ObjectFields, ObjectStore};

/// Object store backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, ObjectFields>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object_field(&self, key: &str, field: &str) -> OrdSetResult<Option<Value>> {
        Ok(self
            .objects
            .get(key)
            .and_then(|obj| obj.get(field).cloned()))
    }

    async fn set_object(&self, key: &str, fields: ObjectFields) -> OrdSetResult<()> {
        if key.is_empty() {
            return Ok(());
        }
        self.objects
            .entry(key.to_string())
            .or_default()
            .extend(fields);
        Ok(())
    }

    async fn get_objects(&self, keys: &[String]) -> OrdSetResult<Vec<Option<ObjectFields>>> {
        Ok(keys
            .iter()
            .map(|k| self.objects.get(k).map(|obj| obj.clone()))
            .collect())
    }

    async fn get_objects_fields(
        &self,
        keys: &[String],
        fields: &[&str],
    ) -> OrdSetResult<Vec<ObjectFields>> {
        Ok(keys
            .iter()
            .map(|k| {
                let obj = self.objects.get(k);
                fields
                    .iter()
                    .map(|f| {
                        let value = obj
                            .as_ref()
                            .and_then(|o| o.get(*f).cloned())
                            .unwrap_or(Value::Null);
                        (f.to_string(), value)
                    })
                    .collect()
            })
            .collect())
    }

    async fn incr_object_field(&self, key: &str, field: &str) -> OrdSetResult<i64> {
        let mut obj = self.objects.entry(key.to_string()).or_default();
        let current = match obj.get(field) {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                OrdSetError::operation_failed("incr_object_field", format!("{key}.{field} is not an integer"))
            })?,
            Some(Value::String(s)) => s.parse::<i64>().map_err(|_| {
                OrdSetError::operation_failed("incr_object_field", format!("{key}.{field} is not an integer"))
            })?,
            Some(_) => {
                return Err(OrdSetError::operation_failed(
                    "incr_object_field",
                    format!("{key}.{field} is not an integer"),
                ))
            }
        };
        let next = current.checked_add(1).ok_or_else(|| {
            OrdSetError::operation_failed("incr_object_field", format!("{key}.{field} would overflow"))
        })?;
        obj.insert(field.to_string(), Value::from(next));
        Ok(next)
    }

    async fn delete_all(&self, keys: &[String]) -> OrdSetResult<()> {
        for key in keys {
            self.objects.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> ObjectFields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_set_object_merges() {
        let store = InMemoryObjectStore::new();
        store.set_object("o", fields(json!({"a": 1}))).await.unwrap();
        store.set_object("o", fields(json!({"b": 2}))).await.unwrap();
        let obj = store.get_objects(&["o".into()]).await.unwrap().remove(0).unwrap();
        assert_eq!(Value::Object(obj), json!({"a": 1, "b": 2}));
    }

    #[tokio::test]
    async fn test_incr_object_field_overflow_is_an_error() {
        let store = InMemoryObjectStore::new();
        store
            .set_object("global", fields(json!({"nextEid": i64::MAX})))
            .await
            .unwrap();
        let err = store.incr_object_field("global", "nextEid").await.unwrap_err();
        assert!(err.is_operation_failed());
        assert_eq!(
            store.get_object_field("global", "nextEid").await.unwrap(),
            Some(json!(i64::MAX))
        );
    }

    #[tokio::test]
    async fn test_incr_object_field() {
        let store = InMemoryObjectStore::new();
        assert_eq!(store.incr_object_field("global", "nextEid").await.unwrap(), 1);
        assert_eq!(store.incr_object_field("global", "nextEid").await.unwrap(), 2);
        assert_eq!(
            store.get_object_field("global", "nextEid").await.unwrap(),
            Some(json!(2))
        );

        store.set_object("bad", fields(json!({"n": "abc"}))).await.unwrap();
        assert!(store.incr_object_field("bad", "n").await.is_err());
    }

    #[tokio::test]
    async fn test_get_objects_fields_fills_nulls() {
        let store = InMemoryObjectStore::new();
        store.set_object("e:1", fields(json!({"type": "restart"}))).await.unwrap();
        let rows = store
            .get_objects_fields(&["e:1".into(), "e:2".into()], &["type"])
            .await
            .unwrap();
        assert_eq!(rows[0]["type"], json!("restart"));
        assert_eq!(rows[1]["type"], Value::Null);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let store = InMemoryObjectStore::new();
        store.set_object("a", fields(json!({"x": 1}))).await.unwrap();
        store.set_object("b", fields(json!({"x": 1}))).await.unwrap();
        store.delete_all(&["a".into()]).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get_objects(&["a".into()]).await.unwrap()[0].is_none());
    }
}
