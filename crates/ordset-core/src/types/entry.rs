//! Ordered-set entries and ranked results.

use serde::{Deserialize, Serialize};

/// One `(setKey, member, score)` triple.
///
/// The emulated backend stores exactly these as rows. The native backend
/// never exposes them individually; they only appear in its ranked reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub member: String,
    pub score: f64,
}

impl Entry {
    pub fn new(key: impl Into<String>, member: impl Into<String>, score: f64) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
            score,
        }
    }
}

/// A member together with its (possibly combined) score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub value: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(value: impl Into<String>, score: f64) -> Self {
        Self {
            value: value.into(),
            score,
        }
    }
}

/// Result of a ranked read: bare members, or members with scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankedMembers {
    Members(Vec<String>),
    WithScores(Vec<ScoredMember>),
}

impl Default for RankedMembers {
    fn default() -> Self {
        RankedMembers::Members(Vec::new())
    }
}

impl RankedMembers {
    /// Project scored entries to the requested shape.
    pub fn project(entries: Vec<ScoredMember>, with_scores: bool) -> Self {
        if with_scores {
            RankedMembers::WithScores(entries)
        } else {
            RankedMembers::Members(entries.into_iter().map(|e| e.value).collect())
        }
    }

    /// An empty result in the requested shape.
    pub fn empty(with_scores: bool) -> Self {
        Self::project(Vec::new(), with_scores)
    }

    pub fn len(&self) -> usize {
        match self {
            RankedMembers::Members(m) => m.len(),
            RankedMembers::WithScores(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Member names in rank order, dropping scores if present.
    pub fn into_members(self) -> Vec<String> {
        match self {
            RankedMembers::Members(m) => m,
            RankedMembers::WithScores(s) => s.into_iter().map(|e| e.value).collect(),
        }
    }

    /// Scored entries, or `None` if scores were not requested.
    pub fn into_scored(self) -> Option<Vec<ScoredMember>> {
        match self {
            RankedMembers::Members(_) => None,
            RankedMembers::WithScores(s) => Some(s),
        }
    }
}
