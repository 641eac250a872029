//! Emulated backend: ordered sets as rows of one flat collection.
//!
//! ```text
//! EmulatedSortedSetBackend
//! └── RowCollection (upsert_many / delete_many / aggregate)
//!     ├── InMemoryRowCollection   (key, member) -> score
//!     └── RocksDbRowCollection    CF sorted_rows
//! ```

mod backend;
mod collection;
mod memory;
mod pipeline;
mod rocksdb_collection;
mod row;

pub use backend::EmulatedSortedSetBackend;
pub use collection::RowCollection;
pub use memory::InMemoryRowCollection;
pub use pipeline::{Document, Pipeline, Stage};
pub use rocksdb_collection::{RocksDbRowCollection, CF_SORTED_ROWS};
pub use row::RowFilter;
