//! Contract of a store with native ranked collections.

use async_trait::async_trait;

use ordset_core::error::OrdSetResult;

use super::command::{Command, Reply};

/// A store that keeps each ordered set as a ranked collection under its own
/// key and executes [`Command`]s against it.
///
/// Implementations must order entries by score and then by member string.
#[async_trait]
pub trait RankedStore: Send + Sync {
    /// Run one command in one round trip.
    async fn execute(&self, command: Command) -> OrdSetResult<Reply>;

    /// Run several commands in one round trip.
    ///
    /// Every command is attempted, in order, regardless of earlier failures.
    /// The outer error is reserved for transport failures; per-command
    /// failures are reported in place.
    async fn exec_batch(&self, commands: Vec<Command>) -> OrdSetResult<Vec<OrdSetResult<Reply>>>;
}
