//! In-process ranked store.
//!
//! Each key holds a member map plus a `(score, member)` ordered index, so
//! ranked reads walk the index directly and ties fall back to member order.
//! Non-persistent; used for tests and single-process deployments.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use tracing::{debug, trace};

use ordset_core::error::OrdSetResult;
use ordset_core::types::{weighted, Aggregate, RankWindow, ScoreRange, ScoredMember};

use super::command::{Command, Reply};
use super::store::RankedStore;
use crate::error::StorageError;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Default, Clone)]
struct RankedSet {
    by_member: HashMap<String, f64>,
    by_score: BTreeSet<(OrderedFloat<f64>, String)>,
}

impl RankedSet {
    /// Upsert; true if the member is new.
    fn insert(&mut self, member: &str, score: f64) -> bool {
        let is_new = match self.by_member.insert(member.to_string(), score) {
            Some(old) => {
                self.by_score.remove(&(OrderedFloat(old), member.to_string()));
                false
            }
            None => true,
        };
        self.by_score.insert((OrderedFloat(score), member.to_string()));
        is_new
    }

    fn remove(&mut self, member: &str) -> bool {
        match self.by_member.remove(member) {
            Some(score) => {
                self.by_score.remove(&(OrderedFloat(score), member.to_string()));
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.by_member.len()
    }

    fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }

    fn score(&self, member: &str) -> Option<f64> {
        self.by_member.get(member).copied()
    }

    fn ranked(&self, rev: bool) -> Box<dyn Iterator<Item = ScoredMember> + '_> {
        let iter = self
            .by_score
            .iter()
            .map(|(score, member)| ScoredMember::new(member.clone(), score.0));
        if rev {
            Box::new(iter.rev())
        } else {
            Box::new(iter)
        }
    }
}

#[derive(Debug, Default)]
struct Keyspace {
    sets: HashMap<String, RankedSet>,
    /// Keys holding something other than a ranked collection.
    foreign: HashSet<String>,
}

impl Keyspace {
    fn check(&self, command: &str, key: &str) -> Result<(), StorageError> {
        if self.foreign.contains(key) {
            return Err(StorageError::rejected(command, WRONGTYPE));
        }
        Ok(())
    }

    fn read(&self, command: &Command) -> Result<Reply, StorageError> {
        let name = command.name();
        match command {
            Command::ZRange {
                key,
                start,
                stop,
                rev,
            } => {
                self.check(name, key)?;
                let window = RankWindow::new(*start, *stop);
                let entries = match self.sets.get(key) {
                    Some(set) => window.apply(set.ranked(*rev)),
                    None => Vec::new(),
                };
                Ok(Reply::Entries(entries))
            }
            Command::ZRangeByScore {
                key,
                range,
                rev,
                offset,
                count,
            } => {
                self.check(name, key)?;
                let Some(set) = self.sets.get(key) else {
                    return Ok(Reply::Entries(Vec::new()));
                };
                let iter = set
                    .ranked(*rev)
                    .filter(|e| range.contains(e.score))
                    .skip(*offset);
                let entries = match count {
                    Some(n) => iter.take(*n).collect(),
                    None => iter.collect(),
                };
                Ok(Reply::Entries(entries))
            }
            Command::ZCard { key } => {
                self.check(name, key)?;
                Ok(Reply::Integer(
                    self.sets.get(key).map_or(0, |s| s.len() as u64),
                ))
            }
            Command::ZScore { key, member } => {
                self.check(name, key)?;
                Ok(Reply::Score(
                    self.sets.get(key).and_then(|s| s.score(member)),
                ))
            }
            other => Err(StorageError::rejected(
                other.name(),
                "not a read-only command",
            )),
        }
    }

    fn write(&mut self, command: Command) -> Result<Reply, StorageError> {
        let name = command.name();
        match command {
            Command::ZAdd { key, entries } => {
                self.check(name, &key)?;
                if entries.iter().any(|e| e.score.is_nan()) {
                    return Err(StorageError::rejected(name, "score is not a valid float"));
                }
                if entries.is_empty() {
                    return Ok(Reply::Integer(0));
                }
                let set = self.sets.entry(key).or_default();
                let added = entries
                    .iter()
                    .filter(|e| set.insert(&e.value, e.score))
                    .count();
                Ok(Reply::Integer(added as u64))
            }
            Command::ZRem { key, members } => {
                self.check(name, &key)?;
                let removed = self.mutate(&key, |set| {
                    members.iter().filter(|m| set.remove(m)).count()
                });
                Ok(Reply::Integer(removed as u64))
            }
            Command::ZRemRangeByScore { key, range } => {
                self.check(name, &key)?;
                let removed = self.mutate(&key, |set| remove_range(set, range));
                Ok(Reply::Integer(removed as u64))
            }
            Command::ZInterStore {
                dest,
                sets,
                weights,
                aggregate,
            } => {
                self.check(name, &dest)?;
                for key in &sets {
                    self.check(name, key)?;
                }
                if weights.len() != sets.len() {
                    return Err(StorageError::rejected(
                        name,
                        format!("{} weights for {} keys", weights.len(), sets.len()),
                    ));
                }
                let result = self.intersection(&sets, &weights, aggregate);
                let len = result.len() as u64;
                if result.is_empty() {
                    self.sets.remove(&dest);
                } else {
                    self.sets.insert(dest, result);
                }
                Ok(Reply::Integer(len))
            }
            Command::Del { keys } => {
                let deleted = keys
                    .iter()
                    .filter(|k| {
                        let set = self.sets.remove(k.as_str()).is_some();
                        let foreign = self.foreign.remove(k.as_str());
                        set || foreign
                    })
                    .count();
                Ok(Reply::Integer(deleted as u64))
            }
            read => self.read(&read),
        }
    }

    /// Run `f` on an existing set and drop the key once it is empty.
    fn mutate(&mut self, key: &str, f: impl FnOnce(&mut RankedSet) -> usize) -> usize {
        let Some(set) = self.sets.get_mut(key) else {
            return 0;
        };
        let n = f(set);
        if set.is_empty() {
            self.sets.remove(key);
        }
        n
    }

    /// Members present in every set, scores weighted then folded in `sets`
    /// order.
    fn intersection(&self, sets: &[String], weights: &[f64], aggregate: Aggregate) -> RankedSet {
        let mut result = RankedSet::default();
        let resolved: Option<Vec<&RankedSet>> = sets.iter().map(|k| self.sets.get(k)).collect();
        let Some(resolved) = resolved else {
            return result;
        };
        let Some(smallest) = resolved.iter().min_by_key(|s| s.len()) else {
            return result;
        };

        for member in smallest.by_member.keys() {
            let scores: Option<Vec<f64>> = resolved
                .iter()
                .zip(weights)
                .map(|(set, w)| set.score(member).map(|s| weighted(s, *w)))
                .collect();
            if let Some(combined) = scores.and_then(|s| aggregate.fold(s)) {
                result.insert(member, combined);
            }
        }
        result
    }
}

fn remove_range(set: &mut RankedSet, range: ScoreRange) -> usize {
    let doomed: Vec<String> = set
        .by_score
        .iter()
        .filter(|(score, _)| range.contains(score.0))
        .map(|(_, member)| member.clone())
        .collect();
    doomed.iter().filter(|m| set.remove(m)).count()
}

/// Ranked store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRankedStore {
    keyspace: RwLock<Keyspace>,
    closed: AtomicBool,
}

impl InMemoryRankedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every further command with `StoreUnavailable`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!("In-memory ranked store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Store a non-ranked value at `key`; ranked commands on it then fail.
    pub fn put_foreign(&self, key: impl Into<String>) {
        let key = key.into();
        let mut keyspace = self.keyspace.write();
        keyspace.sets.remove(&key);
        keyspace.foreign.insert(key);
    }

    /// Number of live keys.
    pub fn key_count(&self) -> usize {
        let keyspace = self.keyspace.read();
        keyspace.sets.len() + keyspace.foreign.len()
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

fn is_read_only(command: &Command) -> bool {
    matches!(
        command,
        Command::ZRange { .. }
            | Command::ZRangeByScore { .. }
            | Command::ZCard { .. }
            | Command::ZScore { .. }
    )
}

#[async_trait]
impl RankedStore for InMemoryRankedStore {
    async fn execute(&self, command: Command) -> OrdSetResult<Reply> {
        self.ensure_open()?;
        trace!(%command, "execute");
        let reply = if is_read_only(&command) {
            self.keyspace.read().read(&command)
        } else {
            self.keyspace.write().write(command)
        };
        Ok(reply?)
    }

    async fn exec_batch(&self, commands: Vec<Command>) -> OrdSetResult<Vec<OrdSetResult<Reply>>> {
        self.ensure_open()?;
        trace!(commands = commands.len(), "exec_batch");
        let mut keyspace = self.keyspace.write();
        Ok(commands
            .into_iter()
            .map(|command| keyspace.write(command).map_err(Into::into))
            .collect())
    }
}
