//! Plugin hook registry.
//!
//! Plugins register handlers under hook names of the form `<type>:<name>`.
//! The type decides how [`HookRegistry::fire`] runs them:
//!
//! | Type | Behaviour |
//! |------|-----------|
//! | `filter` | handlers run in priority order, each receiving the previous output; errors propagate |
//! | `action` | every handler runs on the original payload; errors are logged |
//! | `static` | like `action`, but each handler runs on the blocking pool and is abandoned after [`STATIC_HOOK_TIMEOUT`] |
//! | `response` | handlers run in order on the threaded payload until `res.headersSent` is true |
//!
//! Every successful fire of another hook is followed by
//! [`FIREHOOK`] with `{"hook": <name>, "params": <payload>}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::error::{OrdSetError, OrdSetResult};
use crate::traits::HookPublisher;

/// Priority given to handlers registered without one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// How long a `static` handler may run before the dispatcher moves on.
pub const STATIC_HOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Meta-hook announcing every other fired hook.
pub const FIREHOOK: &str = "action:plugins.firehook";

/// A hook handler. Filter and response hooks use the returned value; the
/// others ignore it.
pub type HookHandler = Arc<dyn Fn(Value) -> OrdSetResult<Value> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookType {
    Filter,
    Action,
    Static,
    Response,
}

impl HookType {
    fn of(hook: &str) -> Option<Self> {
        match hook.split(':').next()? {
            "filter" => Some(HookType::Filter),
            "action" => Some(HookType::Action),
            "static" => Some(HookType::Static),
            "response" => Some(HookType::Response),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct Registration {
    plugin_id: String,
    priority: i32,
    handler: HookHandler,
}

/// Registry and dispatcher for plugin hooks.
pub struct HookRegistry {
    hooks: RwLock<HashMap<String, Vec<Registration>>>,
    deprecated: HashMap<String, Option<String>>,
    static_timeout: Duration,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self {
            hooks: RwLock::default(),
            deprecated: HashMap::new(),
            static_timeout: STATIC_HOOK_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks = self.hooks.read();
        f.debug_struct("HookRegistry")
            .field("hooks", &hooks.keys().collect::<Vec<_>>())
            .field("deprecated", &self.deprecated)
            .field("static_timeout", &self.static_timeout)
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `hook` as deprecated, optionally naming its replacement.
    pub fn with_deprecated(mut self, hook: impl Into<String>, replacement: Option<&str>) -> Self {
        self.deprecated
            .insert(hook.into(), replacement.map(str::to_string));
        self
    }

    pub fn with_static_timeout(mut self, timeout: Duration) -> Self {
        self.static_timeout = timeout;
        self
    }

    /// Register `handler` for `hook` on behalf of `plugin_id`.
    ///
    /// Handlers with lower priority run first; equal priorities run in
    /// registration order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the hook name is empty or has no known type
    /// prefix.
    pub fn register(
        &self,
        plugin_id: &str,
        hook: &str,
        priority: Option<i32>,
        handler: HookHandler,
    ) -> OrdSetResult<()> {
        if hook.is_empty() {
            return Err(OrdSetError::invalid_argument(
                "hook",
                format!("plugin '{plugin_id}' registered an empty hook name"),
            ));
        }
        if HookType::of(hook).is_none() {
            return Err(OrdSetError::invalid_argument(
                "hook",
                format!("unknown hook type in '{hook}'"),
            ));
        }
        if let Some(replacement) = self.deprecated.get(hook) {
            match replacement {
                Some(r) => warn!(plugin = plugin_id, hook, "Hook is deprecated, please use `{}` instead", r),
                None => warn!(plugin = plugin_id, hook, "Hook is deprecated, there is no alternative"),
            }
        }

        let mut hooks = self.hooks.write();
        let list = hooks.entry(hook.to_string()).or_default();
        list.push(Registration {
            plugin_id: plugin_id.to_string(),
            priority: priority.unwrap_or(DEFAULT_PRIORITY),
            handler,
        });
        list.sort_by_key(|r| r.priority);
        debug!(plugin = plugin_id, hook, "Registered hook");
        Ok(())
    }

    /// Remove every handler `plugin_id` registered for `hook`.
    pub fn unregister(&self, plugin_id: &str, hook: &str) {
        let mut hooks = self.hooks.write();
        if let Some(list) = hooks.get_mut(hook) {
            list.retain(|r| r.plugin_id != plugin_id);
            if list.is_empty() {
                hooks.remove(hook);
            }
        }
    }

    pub fn has_listeners(&self, hook: &str) -> bool {
        self.hooks
            .read()
            .get(hook)
            .is_some_and(|list| !list.is_empty())
    }

    fn listeners(&self, hook: &str) -> Vec<Registration> {
        self.hooks.read().get(hook).cloned().unwrap_or_default()
    }

    async fn dispatch(&self, hook: &str, kind: HookType, payload: Value) -> OrdSetResult<Value> {
        let listeners = self.listeners(hook);
        debug!(hook, listeners = listeners.len(), "Firing hook");

        match kind {
            HookType::Filter => listeners
                .iter()
                .try_fold(payload, |acc, r| (r.handler)(acc)),
            HookType::Action => {
                for r in &listeners {
                    if let Err(e) = (r.handler)(payload.clone()) {
                        error!(hook, plugin = %r.plugin_id, error = %e, "Hook handler failed");
                    }
                }
                Ok(payload)
            }
            HookType::Static => {
                for r in &listeners {
                    self.run_static(hook, r, payload.clone()).await;
                }
                Ok(payload)
            }
            HookType::Response => {
                let mut payload = payload;
                for r in &listeners {
                    if headers_sent(&payload) {
                        debug!(hook, plugin = %r.plugin_id, "Response already sent; skipping");
                        continue;
                    }
                    match (r.handler)(payload.clone()) {
                        Ok(next) => payload = next,
                        Err(e) => {
                            error!(hook, plugin = %r.plugin_id, error = %e, "Hook handler failed")
                        }
                    }
                }
                Ok(payload)
            }
        }
    }

    async fn run_static(&self, hook: &str, registration: &Registration, payload: Value) {
        let handler = Arc::clone(&registration.handler);
        let call = tokio::task::spawn_blocking(move || handler(payload));
        match tokio::time::timeout(self.static_timeout, call).await {
            Ok(Ok(Ok(_))) => {}
            Ok(Ok(Err(e))) => {
                error!(hook, plugin = %registration.plugin_id, error = %e, "Hook handler failed")
            }
            Ok(Err(e)) => {
                error!(hook, plugin = %registration.plugin_id, error = %e, "Hook handler panicked")
            }
            Err(_) => warn!(
                hook,
                plugin = %registration.plugin_id,
                timeout_ms = self.static_timeout.as_millis() as u64,
                "Hook handler timed out"
            ),
        }
    }
}

fn headers_sent(payload: &Value) -> bool {
    payload
        .pointer("/res/headersSent")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[async_trait]
impl HookPublisher for HookRegistry {
    async fn fire(&self, hook: &str, payload: Value) -> OrdSetResult<Value> {
        let Some(kind) = HookType::of(hook) else {
            warn!(hook, "Unknown hook type; nothing fired");
            return Ok(payload);
        };
        let announce = (hook != FIREHOOK && self.has_listeners(FIREHOOK)).then(|| payload.clone());
        let result = self.dispatch(hook, kind, payload).await?;
        if let Some(params) = announce {
            self.dispatch(FIREHOOK, HookType::Action, json!({ "hook": hook, "params": params }))
                .await?;
        }
        Ok(result)
    }
}
