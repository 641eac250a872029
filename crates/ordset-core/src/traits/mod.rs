//! Contracts between the facade and its collaborators.
//!
//! # Traits
//!
//! - [`SortedSetBackend`]: one storage engine's ordered-set implementation
//! - [`ObjectStore`]: hash-object storage for counters and records
//! - [`HookPublisher`]: plugin hook dispatch

mod hooks;
mod object_store;
mod sorted_set_backend;

pub use hooks::{HookPublisher, NoopHooks};
pub use object_store::{ObjectFields, ObjectStore};
pub use sorted_set_backend::{BackendKind, RangeQuery, ScoreRangeQuery, SortedSetBackend};
