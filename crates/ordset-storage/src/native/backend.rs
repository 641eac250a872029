//! [`SortedSetBackend`] over a [`RankedStore`].
//!
//! Single-key operations map to one command. Multi-key operations become one
//! command per key submitted as a single batch. Intersections are computed
//! by the store itself into a temporary key which is read and deleted in
//! the same batch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use ordset_core::batch::{BatchExecutor, BatchOutcome, BatchRemover, RemovalBatch, RemovalOp};
use ordset_core::error::{OrdSetError, OrdSetResult};
use ordset_core::traits::{BackendKind, RangeQuery, ScoreRangeQuery, SortedSetBackend};
use ordset_core::types::{Aggregate, IntersectQuery, RankedMembers, ScoreRange, ScoredMember};

use super::command::{Command, Reply};
use super::store::RankedStore;

/// Prefix of the scratch keys intersections are stored under.
pub const TEMP_KEY_PREFIX: &str = "temp:";

/// Native ordered-set backend.
pub struct NativeSortedSetBackend<S> {
    store: Arc<S>,
}

impl<S> std::fmt::Debug for NativeSortedSetBackend<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSortedSetBackend").finish_non_exhaustive()
    }
}

impl<S: RankedStore> NativeSortedSetBackend<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run `commands` as one round trip and fail the whole group if any
    /// command failed.
    async fn run_batch(&self, operation: &str, commands: Vec<Command>) -> OrdSetResult<Vec<Reply>> {
        let total = commands.len();
        let results = self.store.exec_batch(commands).await?;

        let mut replies = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(reply) => replies.push(reply),
                Err(e) => failures.push(format!("command {i}: {e}")),
            }
        }
        if !failures.is_empty() {
            warn!(operation, failed = failures.len(), total, "Batch had failing commands");
            return Err(OrdSetError::operation_failed(
                operation,
                format!("{} of {} commands failed: {}", failures.len(), total, failures.join("; ")),
            ));
        }
        Ok(replies)
    }

    /// Reply at `index` of a batch that is known to have that many replies.
    fn nth(replies: Vec<Reply>, index: usize, operation: &str) -> OrdSetResult<Reply> {
        replies.into_iter().nth(index).ok_or_else(|| {
            OrdSetError::operation_failed(operation, "batch returned too few replies")
        })
    }

    fn temp_key() -> String {
        format!("{TEMP_KEY_PREFIX}{}", Uuid::new_v4())
    }
}

fn removal_command(op: RemovalOp) -> Command {
    match op {
        RemovalOp::Members { key, members } => Command::ZRem { key, members },
        RemovalOp::ScoreRange { key, range } => Command::ZRemRangeByScore { key, range },
    }
}

#[async_trait]
impl<S: RankedStore + 'static> BatchExecutor for NativeSortedSetBackend<S> {
    async fn execute_removals(&self, batch: RemovalBatch) -> OrdSetResult<BatchOutcome> {
        let commands: Vec<Command> = batch.into_ops().into_iter().map(removal_command).collect();
        let count = commands.len();
        let replies = self.run_batch("removal batch", commands).await?;
        let mut removed = 0;
        for reply in replies {
            removed += reply.into_integer("removal batch")?;
        }
        Ok(BatchOutcome {
            commands: count,
            removed,
        })
    }
}

#[async_trait]
impl<S: RankedStore + 'static> SortedSetBackend for NativeSortedSetBackend<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    async fn add(&self, key: &str, entries: &[ScoredMember]) -> OrdSetResult<()> {
        self.store
            .execute(Command::ZAdd {
                key: key.to_string(),
                entries: entries.to_vec(),
            })
            .await?;
        Ok(())
    }

    async fn sets_add(&self, keys: &[String], score: f64, member: &str) -> OrdSetResult<()> {
        let commands = keys
            .iter()
            .map(|key| Command::ZAdd {
                key: key.clone(),
                entries: vec![ScoredMember::new(member, score)],
            })
            .collect();
        self.run_batch("sets_add", commands).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[String], members: &[String]) -> OrdSetResult<()> {
        if let [key] = keys {
            self.store
                .execute(Command::ZRem {
                    key: key.clone(),
                    members: members.to_vec(),
                })
                .await?;
            return Ok(());
        }
        BatchRemover::new(self).remove_members(keys, members).await?;
        Ok(())
    }

    async fn remove_from_sets(&self, keys: &[String], member: &str) -> OrdSetResult<()> {
        self.remove(keys, &[member.to_string()]).await
    }

    async fn remove_range_by_score(&self, keys: &[String], range: ScoreRange) -> OrdSetResult<()> {
        if let [key] = keys {
            self.store
                .execute(Command::ZRemRangeByScore {
                    key: key.clone(),
                    range,
                })
                .await?;
            return Ok(());
        }
        BatchRemover::new(self)
            .remove_range_by_score(keys, range)
            .await?;
        Ok(())
    }

    async fn range(&self, key: &str, query: RangeQuery) -> OrdSetResult<Vec<ScoredMember>> {
        let command = Command::ZRange {
            key: key.to_string(),
            start: query.window.start(),
            stop: query.window.stop_index(),
            rev: query.order.is_descending(),
        };
        let name = command.name();
        self.store.execute(command).await?.into_entries(name)
    }

    async fn range_by_score(
        &self,
        key: &str,
        query: ScoreRangeQuery,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        let command = Command::ZRangeByScore {
            key: key.to_string(),
            range: query.range,
            rev: query.order.is_descending(),
            offset: query.offset,
            count: query.count,
        };
        let name = command.name();
        self.store.execute(command).await?.into_entries(name)
    }

    async fn card(&self, key: &str) -> OrdSetResult<u64> {
        self.store
            .execute(Command::ZCard {
                key: key.to_string(),
            })
            .await?
            .into_integer("ZCARD")
    }

    async fn score(&self, key: &str, member: &str) -> OrdSetResult<Option<f64>> {
        self.store
            .execute(Command::ZScore {
                key: key.to_string(),
                member: member.to_string(),
            })
            .await?
            .into_score("ZSCORE")
    }

    #[instrument(skip_all, fields(sets = query.sets.len()), level = "debug")]
    async fn intersect(&self, query: &IntersectQuery) -> OrdSetResult<RankedMembers> {
        let dest = Self::temp_key();
        let commands = vec![
            Command::ZInterStore {
                dest: dest.clone(),
                sets: query.sets.clone(),
                weights: query.weights.clone(),
                aggregate: query.aggregate,
            },
            Command::ZRange {
                key: dest.clone(),
                start: query.window.start(),
                stop: query.window.stop_index(),
                rev: query.order.is_descending(),
            },
            Command::Del { keys: vec![dest] },
        ];
        let replies = self.run_batch("intersect", commands).await?;
        let entries = Self::nth(replies, 1, "intersect")?.into_entries("intersect")?;
        debug!(results = entries.len(), "intersect");
        Ok(RankedMembers::project(entries, query.with_scores))
    }

    async fn intersect_card(&self, keys: &[String]) -> OrdSetResult<u64> {
        let dest = Self::temp_key();
        let commands = vec![
            Command::ZInterStore {
                dest: dest.clone(),
                sets: keys.to_vec(),
                weights: vec![1.0; keys.len()],
                aggregate: Aggregate::Sum,
            },
            Command::Del { keys: vec![dest] },
        ];
        let replies = self.run_batch("intersect_card", commands).await?;
        Self::nth(replies, 0, "intersect_card")?.into_integer("intersect_card")
    }
}
