//! Ranked-collection commands and their replies.

use std::fmt;

use ordset_core::error::{OrdSetError, OrdSetResult};
use ordset_core::types::{Aggregate, ScoreRange, ScoredMember};

/// One command understood by a [`RankedStore`](super::RankedStore).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Upsert members; replies with the number of new members.
    ZAdd {
        key: String,
        entries: Vec<ScoredMember>,
    },
    /// Remove members; replies with the number removed.
    ZRem { key: String, members: Vec<String> },
    /// Remove entries scored within `range`; replies with the number removed.
    ZRemRangeByScore { key: String, range: ScoreRange },
    /// Ranks `start..=stop` (`stop = -1` for the end), ascending or reversed.
    ZRange {
        key: String,
        start: usize,
        stop: i64,
        rev: bool,
    },
    /// Entries within `range`, then `offset`/`count` paging.
    ZRangeByScore {
        key: String,
        range: ScoreRange,
        rev: bool,
        offset: usize,
        count: Option<usize>,
    },
    ZCard { key: String },
    ZScore { key: String, member: String },
    /// Store the weighted intersection of `sets` at `dest`; replies with its
    /// cardinality.
    ZInterStore {
        dest: String,
        sets: Vec<String>,
        weights: Vec<f64>,
        aggregate: Aggregate,
    },
    /// Delete whole keys; replies with the number deleted.
    Del { keys: Vec<String> },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ZAdd { .. } => "ZADD",
            Command::ZRem { .. } => "ZREM",
            Command::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
            Command::ZRange { rev: false, .. } => "ZRANGE",
            Command::ZRange { rev: true, .. } => "ZREVRANGE",
            Command::ZRangeByScore { rev: false, .. } => "ZRANGEBYSCORE",
            Command::ZRangeByScore { rev: true, .. } => "ZREVRANGEBYSCORE",
            Command::ZCard { .. } => "ZCARD",
            Command::ZScore { .. } => "ZSCORE",
            Command::ZInterStore { .. } => "ZINTERSTORE",
            Command::Del { .. } => "DEL",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ZAdd { key, entries } => write!(f, "ZADD {key} ({} entries)", entries.len()),
            Command::ZRem { key, members } => write!(f, "ZREM {key} ({} members)", members.len()),
            Command::ZRemRangeByScore { key, range } => write!(f, "ZREMRANGEBYSCORE {key} {range}"),
            Command::ZRange { key, start, stop, .. } => {
                write!(f, "{} {key} {start} {stop}", self.name())
            }
            Command::ZRangeByScore { key, range, .. } => write!(f, "{} {key} {range}", self.name()),
            Command::ZCard { key } => write!(f, "ZCARD {key}"),
            Command::ZScore { key, member } => write!(f, "ZSCORE {key} {member}"),
            Command::ZInterStore { dest, sets, .. } => {
                write!(f, "ZINTERSTORE {dest} {}", sets.join(" "))
            }
            Command::Del { keys } => write!(f, "DEL {}", keys.join(" ")),
        }
    }
}

/// Reply to a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Integer(u64),
    Entries(Vec<ScoredMember>),
    Score(Option<f64>),
}

impl Reply {
    pub fn into_integer(self, command: &str) -> OrdSetResult<u64> {
        match self {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected(command, &other)),
        }
    }

    pub fn into_entries(self, command: &str) -> OrdSetResult<Vec<ScoredMember>> {
        match self {
            Reply::Entries(entries) => Ok(entries),
            other => Err(unexpected(command, &other)),
        }
    }

    pub fn into_score(self, command: &str) -> OrdSetResult<Option<f64>> {
        match self {
            Reply::Score(score) => Ok(score),
            other => Err(unexpected(command, &other)),
        }
    }
}

fn unexpected(command: &str, reply: &Reply) -> OrdSetError {
    OrdSetError::operation_failed(command, format!("unexpected reply {reply:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_direction() {
        let cmd = Command::ZRange {
            key: "k".into(),
            start: 0,
            stop: -1,
            rev: true,
        };
        assert_eq!(cmd.name(), "ZREVRANGE");
        assert_eq!(cmd.to_string(), "ZREVRANGE k 0 -1");
    }

    #[test]
    fn test_reply_shape_mismatch_is_an_error() {
        assert_eq!(Reply::Integer(3).into_integer("ZCARD").unwrap(), 3);
        let err = Reply::Score(None).into_entries("ZRANGE").unwrap_err();
        assert!(err.is_operation_failed());
    }
}
