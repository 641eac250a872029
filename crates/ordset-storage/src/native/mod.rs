//! Native backend: ordered sets as ranked collections, one per key.
//!
//! ```text
//! NativeSortedSetBackend
//! └── RankedStore (execute / exec_batch)
//!     └── InMemoryRankedStore
//!         └── key -> { member -> score, (score, member) index }
//! ```

mod backend;
mod command;
mod memory;
mod store;

pub use backend::{NativeSortedSetBackend, TEMP_KEY_PREFIX};
pub use command::{Command, Reply};
pub use memory::InMemoryRankedStore;
pub use store::RankedStore;
