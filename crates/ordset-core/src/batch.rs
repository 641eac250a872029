//! Batched multi-key removal.
//!
//! A removal that spans several keys is expanded into one command per key
//! and the whole group is submitted as ONE round trip through a
//! [`BatchExecutor`]. The executor attempts every command; if any of them
//! fails the whole call fails, and keys whose commands succeeded stay
//! mutated. Callers only ever see success or the failure, never a per-key
//! report.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::OrdSetResult;
use crate::types::ScoreRange;

/// One per-key removal command.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOp {
    /// Remove listed members from one key.
    Members { key: String, members: Vec<String> },
    /// Remove entries of one key whose score lies in the range.
    ScoreRange { key: String, range: ScoreRange },
}

impl RemovalOp {
    pub fn key(&self) -> &str {
        match self {
            RemovalOp::Members { key, .. } | RemovalOp::ScoreRange { key, .. } => key,
        }
    }
}

/// Removal commands submitted together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalBatch {
    ops: Vec<RemovalOp>,
}

impl RemovalBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: RemovalOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[RemovalOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<RemovalOp> {
        self.ops
    }

    /// One `Members` command per key.
    pub fn members(keys: &[String], members: &[String]) -> Self {
        Self {
            ops: keys
                .iter()
                .map(|key| RemovalOp::Members {
                    key: key.clone(),
                    members: members.to_vec(),
                })
                .collect(),
        }
    }

    /// One `ScoreRange` command per key.
    pub fn score_range(keys: &[String], range: ScoreRange) -> Self {
        Self {
            ops: keys
                .iter()
                .map(|key| RemovalOp::ScoreRange {
                    key: key.clone(),
                    range,
                })
                .collect(),
        }
    }
}

/// What a successful batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Commands executed.
    pub commands: usize,
    /// Entries removed across all keys.
    pub removed: u64,
}

/// A store able to run a [`RemovalBatch`] in one round trip.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    /// Run every command of the batch.
    ///
    /// # Errors
    ///
    /// `StoreOperationFailed` if at least one command failed. All commands
    /// are attempted regardless.
    async fn execute_removals(&self, batch: RemovalBatch) -> OrdSetResult<BatchOutcome>;
}

/// Groups multi-key removals into single batched round trips.
pub struct BatchRemover<'a, E: BatchExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: BatchExecutor + ?Sized> BatchRemover<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Remove every member from every key.
    pub async fn remove_members(
        &self,
        keys: &[String],
        members: &[String],
    ) -> OrdSetResult<BatchOutcome> {
        if members.is_empty() {
            return Ok(BatchOutcome::default());
        }
        self.submit(RemovalBatch::members(keys, members)).await
    }

    /// Remove every entry within `range` from every key.
    pub async fn remove_range_by_score(
        &self,
        keys: &[String],
        range: ScoreRange,
    ) -> OrdSetResult<BatchOutcome> {
        self.submit(RemovalBatch::score_range(keys, range)).await
    }

    /// Submit a prepared batch.
    pub async fn submit(&self, batch: RemovalBatch) -> OrdSetResult<BatchOutcome> {
        if batch.is_empty() {
            return Ok(BatchOutcome::default());
        }
        let commands = batch.len();
        match self.executor.execute_removals(batch).await {
            Ok(outcome) => {
                debug!(commands, removed = outcome.removed, "Removal batch executed");
                Ok(outcome)
            }
            Err(e) => {
                warn!(
                    commands,
                    error = %e,
                    "Removal batch failed; keys were attempted independently"
                );
                Err(e)
            }
        }
    }
}
