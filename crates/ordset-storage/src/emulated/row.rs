//! Row filters over the flat `(key, member, score)` collection.

use std::collections::HashSet;

use ordset_core::types::{Entry, ScoreRange};

/// Selects rows by key, optionally narrowed by member and score.
///
/// Keys are kept in the order given (duplicates dropped); collections scan
/// them in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    keys: Vec<String>,
    members: Option<Vec<String>>,
    score: Option<ScoreRange>,
}

impl RowFilter {
    /// Rows of any of `keys`.
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut seen = HashSet::new();
        let keys = keys
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| seen.insert(k.clone()))
            .collect();
        Self {
            keys,
            members: None,
            score: None,
        }
    }

    /// Rows of one key.
    pub fn key(key: impl Into<String>) -> Self {
        Self::keys([key.into()])
    }

    /// Narrow to the listed members.
    pub fn members<I, M>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.members = Some(members.into_iter().map(Into::into).collect());
        self
    }

    /// Narrow to scores within `range`.
    pub fn score(mut self, range: ScoreRange) -> Self {
        self.score = Some(range);
        self
    }

    pub fn key_list(&self) -> &[String] {
        &self.keys
    }

    pub fn member_list(&self) -> Option<&[String]> {
        self.members.as_deref()
    }

    pub fn score_range(&self) -> Option<ScoreRange> {
        self.score
    }

    /// Whether a row of `key` with `member`/`score` passes the member and
    /// score conditions. The key condition is the caller's scan.
    pub fn admits(&self, member: &str, score: f64) -> bool {
        let member_ok = self
            .members
            .as_ref()
            .map_or(true, |ms| ms.iter().any(|m| m == member));
        let score_ok = self.score.map_or(true, |r| r.contains(score));
        member_ok && score_ok
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.keys.iter().any(|k| *k == entry.key) && self.admits(&entry.member, entry.score)
    }
}
