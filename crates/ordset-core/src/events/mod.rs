//! Administrative event log.
//!
//! Events are objects `event:<eid>` in the [`ObjectStore`], indexed by
//! timestamp (ms) in the ordered sets `events:time` and
//! `events:time:<type>`.

mod format;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{OrdSetError, OrdSetResult};
use crate::facade::SortedSets;
use crate::paging::{process_sorted_set, PagingOptions};
use crate::traits::{HookPublisher, NoopHooks, ObjectFields, ObjectStore};
use crate::types::ScoreRange;

pub use format::{escape_html, identity_free_json};

/// Set holding every event id.
pub const EVENTS_KEY: &str = "events:time";

/// Known event types. Plugins may log others.
pub const EVENT_TYPES: &[&str] = &[
    "plugin-activate",
    "plugin-deactivate",
    "restart",
    "build",
    "config-change",
    "settings-change",
    "category-purge",
    "privilege-change",
    "post-delete",
    "post-restore",
    "post-purge",
    "topic-delete",
    "topic-restore",
    "topic-purge",
    "topic-rename",
    "password-reset",
    "user-makeAdmin",
    "user-removeAdmin",
    "user-ban",
    "user-unban",
    "user-delete",
    "password-change",
    "email-change",
    "username-change",
    "ip-blacklist-save",
    "ip-blacklist-addRule",
    "registration-approved",
    "registration-rejected",
    "accept-membership",
    "reject-membership",
    "theme-set",
    "export:uploads",
    "account-locked",
    "getUsersCSV",
];

fn type_key(event_type: &str) -> String {
    format!("{EVENTS_KEY}:{event_type}")
}

fn object_key(eid: &str) -> String {
    format!("event:{eid}")
}

/// An event as returned by [`EventLog::get_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Stored fields, string values HTML-escaped.
    #[serde(flatten)]
    pub fields: ObjectFields,
    /// Pretty JSON of every field except the identity ones.
    pub json_string: String,
    /// RFC 2822 rendering of `timestamp`, if it parses.
    #[serde(rename = "timestampISO")]
    pub timestamp_iso: Option<String>,
}

impl EventRecord {
    pub fn eid(&self) -> Option<i64> {
        self.fields.get("eid").and_then(Value::as_i64)
    }

    pub fn event_type(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }
}

/// Event log over the ordered-set facade and an object store.
#[derive(Clone)]
pub struct EventLog {
    sets: SortedSets,
    objects: Arc<dyn ObjectStore>,
    hooks: Arc<dyn HookPublisher>,
    paging: PagingOptions,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("sets", &self.sets)
            .field("paging", &self.paging)
            .finish()
    }
}

impl EventLog {
    pub fn new(sets: SortedSets, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            sets,
            objects,
            hooks: Arc::new(NoopHooks),
            paging: PagingOptions::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn HookPublisher>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_paging(mut self, paging: PagingOptions) -> Self {
        self.paging = paging;
        self
    }

    /// Record an event and return its id.
    ///
    /// `fields` may carry anything; `type`, `eid` and `timestamp` are
    /// overwritten.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty type; store errors otherwise.
    #[instrument(skip(self, fields))]
    pub async fn log(&self, event_type: &str, mut fields: ObjectFields) -> OrdSetResult<i64> {
        if event_type.is_empty() {
            return Err(OrdSetError::invalid_argument("type", "event type must not be empty"));
        }
        if !EVENT_TYPES.contains(&event_type) {
            debug!(event_type, "Logging event of unlisted type");
        }

        let eid = self.objects.incr_object_field("global", "nextEid").await?;
        let timestamp = Utc::now().timestamp_millis();
        fields.insert("type".into(), Value::from(event_type));
        fields.insert("timestamp".into(), Value::from(timestamp));
        fields.insert("eid".into(), Value::from(eid));

        let index_keys = vec![EVENTS_KEY.to_string(), type_key(event_type)];
        let key = object_key(&eid.to_string());
        tokio::try_join!(
            self.sets.sets_add(index_keys, timestamp as f64, eid),
            self.objects.set_object(&key, fields.clone()),
        )?;

        self.hooks
            .fire("action:events.log", Value::Object(fields))
            .await?;
        info!(eid, event_type, "Event logged");
        Ok(eid)
    }

    /// Newest-first events ranked `start..=stop`, optionally restricted to
    /// one type and to timestamps within `from..=to` (defaults: 0 and now).
    pub async fn get_events(
        &self,
        filter: Option<&str>,
        start: usize,
        stop: i64,
        from: Option<i64>,
        to: Option<i64>,
    ) -> OrdSetResult<Vec<EventRecord>> {
        let key = match filter {
            Some(t) if !t.is_empty() => type_key(t),
            _ => EVENTS_KEY.to_string(),
        };
        let count = usize::try_from(stop)
            .ok()
            .map(|stop| (stop + 1).saturating_sub(start));
        let from = from.unwrap_or(0);
        let to = to.unwrap_or_else(|| Utc::now().timestamp_millis());
        let range = ScoreRange::from_f64(from as f64, to as f64)?;

        let eids = self.sets.rev_range_by_score(&key, start, count, range).await?;
        let keys: Vec<String> = eids.iter().map(|eid| object_key(eid)).collect();
        let objects = self.objects.get_objects(&keys).await?;

        Ok(objects.into_iter().flatten().map(format::render).collect())
    }

    /// Human-readable listing of the newest `num_events` events
    /// (default 10), one line per event. Zero lists every event.
    pub async fn output(&self, num_events: Option<usize>) -> OrdSetResult<String> {
        let num_events = num_events.unwrap_or(10);
        let mut out = format!("\nDisplaying last {num_events} administrative events...\n");
        let stop = i64::try_from(num_events).unwrap_or(i64::MAX) - 1;
        for event in self.get_events(None, 0, stop, None, None).await? {
            out.push_str(&format::summary_line(&event));
            out.push('\n');
        }
        Ok(out)
    }

    /// Delete events and unindex them.
    pub async fn delete_events(&self, eids: &[String]) -> OrdSetResult<()> {
        if eids.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = eids.iter().map(|eid| object_key(eid)).collect();
        let types = self.objects.get_objects_fields(&keys, &["type"]).await?;

        let mut index_keys = vec![EVENTS_KEY.to_string()];
        for fields in &types {
            let event_type = match fields.get("type") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => other.to_string(),
            };
            let key = type_key(&event_type);
            if !index_keys.contains(&key) {
                index_keys.push(key);
            }
        }

        debug!(events = eids.len(), sets = index_keys.len(), "Deleting events");
        tokio::try_join!(
            self.objects.delete_all(&keys),
            self.sets.remove(index_keys, eids.to_vec()),
        )?;
        Ok(())
    }

    /// Delete every event, page by page. Returns how many were deleted.
    pub async fn delete_all(&self) -> OrdSetResult<usize> {
        let this = self;
        let deleted = process_sorted_set(
            &self.sets,
            EVENTS_KEY,
            self.paging.always_start_at_zero(),
            move |eids| async move { this.delete_events(&eids).await },
        )
        .await?;
        info!(deleted, "All events deleted");
        Ok(deleted)
    }
}
