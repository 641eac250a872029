//! Publish side of the plugin hook dispatcher.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::OrdSetResult;

/// Publishes named hooks to whatever plugins are listening.
///
/// Action hooks ignore the returned payload; filter hooks return the
/// payload as transformed by their listeners.
#[async_trait]
pub trait HookPublisher: Send + Sync {
    async fn fire(&self, hook: &str, payload: Value) -> OrdSetResult<Value>;
}

/// Publisher with no listeners.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

#[async_trait]
impl HookPublisher for NoopHooks {
    async fn fire(&self, _hook: &str, payload: Value) -> OrdSetResult<Value> {
        Ok(payload)
    }
}
