//! Ordered-set facade over interchangeable storage backends.
//!
//! An ordered set is a named collection of unique string members, each with
//! a floating-point score. [`SortedSets`] exposes removal, ranked reads and
//! weighted intersection with identical observable results whether it is
//! bound to a store with native ordered sets or to a document store that
//! emulates them.
//!
//! # Modules
//!
//! - [`types`]: scores, windows, parameters and results
//! - [`traits`]: the backend, object store and hook contracts
//! - [`codec`]: member canonicalization
//! - [`batch`]: multi-key removal batching
//! - [`facade`]: the [`SortedSets`] entry point
//! - [`paging`]: page-by-page set traversal
//! - [`events`]: administrative event log built on the facade
//! - [`hooks`]: plugin hook registry
//! - [`config`], [`logging`], [`error`]: ambient setup
//!
//! Backends live in the `ordset-storage` crate.

pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod hooks;
pub mod logging;
pub mod objects;
pub mod paging;
pub mod traits;
pub mod types;

pub use config::Config;
pub use error::{OrdSetError, OrdSetResult};
pub use events::{EventLog, EventRecord, EVENT_TYPES};
pub use facade::SortedSets;
pub use hooks::HookRegistry;
pub use objects::InMemoryObjectStore;
pub use paging::{process_sorted_set, PagingOptions};
pub use traits::{BackendKind, HookPublisher, ObjectStore, SortedSetBackend};
