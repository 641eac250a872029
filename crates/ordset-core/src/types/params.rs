//! Call parameters and their normalized forms.
//!
//! Callers build loose parameter values ([`KeySet`], [`MemberSet`],
//! [`IntersectParams`]); the facade normalizes them once per call into
//! immutable query values that are handed down to the bound backend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::Member;
use crate::error::{OrdSetError, OrdSetResult};

use super::score::{Aggregate, SortOrder};
use super::window::RankWindow;

// =========================================================================
// Key selection
// =========================================================================

/// One or many set keys.
///
/// A single empty key selects nothing, so operations given `""` return
/// immediately just like those given an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet(Vec<String>);

impl KeySet {
    pub fn new(keys: Vec<String>) -> Self {
        Self(keys)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    fn single(key: String) -> Self {
        if key.is_empty() {
            Self(Vec::new())
        } else {
            Self(vec![key])
        }
    }
}

impl From<&str> for KeySet {
    fn from(key: &str) -> Self {
        Self::single(key.to_string())
    }
}

impl From<String> for KeySet {
    fn from(key: String) -> Self {
        Self::single(key)
    }
}

impl From<&String> for KeySet {
    fn from(key: &String) -> Self {
        Self::single(key.clone())
    }
}

impl From<Vec<String>> for KeySet {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for KeySet {
    fn from(keys: Vec<&str>) -> Self {
        Self(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for KeySet {
    fn from(keys: &[String]) -> Self {
        Self(keys.to_vec())
    }
}

impl From<&[&str]> for KeySet {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeySet {
    fn from(keys: [&str; N]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }
}

// =========================================================================
// Member selection
// =========================================================================

/// One or many members, already canonicalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSet(Vec<String>);

impl MemberSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Build from a JSON scalar or array.
    ///
    /// A top-level `null` selects nothing. `null` inside an array, nested
    /// arrays and objects are rejected.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for values the codec cannot canonicalize.
    pub fn from_json(value: &Value) -> OrdSetResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Array(items) => items
                .iter()
                .map(|v| Member::from_json(v).map(|m| m.canonical()))
                .collect::<OrdSetResult<Vec<_>>>()
                .map(Self),
            scalar => Ok(Self::from(Member::from_json(scalar)?)),
        }
    }

    /// A lone empty member selects nothing, like a lone empty key.
    fn single(member: String) -> Self {
        if member.is_empty() {
            Self(Vec::new())
        } else {
            Self(vec![member])
        }
    }

    fn collect<T: Into<Member>>(items: impl IntoIterator<Item = T>) -> Self {
        Self(items.into_iter().map(|m| m.into().canonical()).collect())
    }
}

impl From<Member> for MemberSet {
    fn from(member: Member) -> Self {
        Self::single(member.canonical())
    }
}

impl From<&str> for MemberSet {
    fn from(member: &str) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<String> for MemberSet {
    fn from(member: String) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<&String> for MemberSet {
    fn from(member: &String) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<i64> for MemberSet {
    fn from(member: i64) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<u64> for MemberSet {
    fn from(member: u64) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<i32> for MemberSet {
    fn from(member: i32) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<f64> for MemberSet {
    fn from(member: f64) -> Self {
        Self::from(Member::from(member))
    }
}

impl From<Vec<Member>> for MemberSet {
    fn from(members: Vec<Member>) -> Self {
        Self::collect(members)
    }
}

impl From<Vec<String>> for MemberSet {
    fn from(members: Vec<String>) -> Self {
        Self::collect(members)
    }
}

impl From<Vec<&str>> for MemberSet {
    fn from(members: Vec<&str>) -> Self {
        Self::collect(members)
    }
}

impl From<Vec<i64>> for MemberSet {
    fn from(members: Vec<i64>) -> Self {
        Self::collect(members)
    }
}

impl From<Vec<u64>> for MemberSet {
    fn from(members: Vec<u64>) -> Self {
        Self::collect(members)
    }
}

impl From<&[String]> for MemberSet {
    fn from(members: &[String]) -> Self {
        Self::collect(members)
    }
}

impl From<&[&str]> for MemberSet {
    fn from(members: &[&str]) -> Self {
        Self::collect(members.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for MemberSet {
    fn from(members: [&str; N]) -> Self {
        Self::collect(members)
    }
}

// =========================================================================
// Intersection
// =========================================================================

/// Caller-facing intersection parameters.
///
/// Deserializes from the JSON shape higher layers pass around:
/// `{"sets": [...], "start": 0, "stop": -1, "weights": [...],
///   "aggregate": "SUM", "withScores": false, "sort": "ascending"}`.
///
/// ```rust
/// use ordset_core::types::{Aggregate, IntersectParams};
///
/// let params = IntersectParams::new(["A", "B"])
///     .weights(vec![1.0, 2.0])
///     .aggregate(Aggregate::Max)
///     .range(0, 9)
///     .with_scores(true);
/// let query = params.normalize().unwrap().unwrap();
/// assert_eq!(query.weights, vec![1.0, 2.0]);
/// assert_eq!(query.window.limit(), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntersectParams {
    pub sets: Vec<String>,
    pub start: usize,
    pub stop: i64,
    pub weights: Vec<f64>,
    pub aggregate: Aggregate,
    pub with_scores: bool,
    #[serde(rename = "sort")]
    pub order: SortOrder,
}

impl Default for IntersectParams {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            start: 0,
            stop: -1,
            weights: Vec::new(),
            aggregate: Aggregate::Sum,
            with_scores: false,
            order: SortOrder::Ascending,
        }
    }
}

impl IntersectParams {
    pub fn new(sets: impl Into<KeySet>) -> Self {
        Self {
            sets: sets.into().into_vec(),
            ..Default::default()
        }
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn range(mut self, start: usize, stop: i64) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    pub fn with_scores(mut self, with_scores: bool) -> Self {
        self.with_scores = with_scores;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Apply defaults and validate.
    ///
    /// Returns `Ok(None)` when `sets` is empty: the intersection of nothing
    /// is the empty result, not an error. Missing trailing weights default
    /// to 1.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a set is named twice, when there are more
    /// weights than sets, or when a weight is NaN.
    pub fn normalize(self) -> OrdSetResult<Option<IntersectQuery>> {
        if self.sets.is_empty() {
            return Ok(None);
        }
        if self.weights.len() > self.sets.len() {
            return Err(OrdSetError::invalid_argument(
                "weights",
                format!(
                    "{} weights given for {} sets",
                    self.weights.len(),
                    self.sets.len()
                ),
            ));
        }
        if self.weights.iter().any(|w| w.is_nan()) {
            return Err(OrdSetError::invalid_argument(
                "weights",
                "NaN is not a valid weight",
            ));
        }
        let mut seen = HashSet::with_capacity(self.sets.len());
        if let Some(dup) = self.sets.iter().find(|k| !seen.insert(k.as_str())) {
            return Err(OrdSetError::invalid_argument(
                "sets",
                format!("set '{dup}' is named more than once"),
            ));
        }

        let mut weights = self.weights;
        weights.resize(self.sets.len(), 1.0);

        Ok(Some(IntersectQuery {
            sets: self.sets,
            weights,
            aggregate: self.aggregate,
            window: RankWindow::new(self.start, self.stop),
            with_scores: self.with_scores,
            order: self.order,
        }))
    }
}

/// A validated intersection, as handed to a backend.
///
/// Invariants: `sets` is non-empty with distinct keys and
/// `weights.len() == sets.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectQuery {
    pub sets: Vec<String>,
    pub weights: Vec<f64>,
    pub aggregate: Aggregate,
    pub window: RankWindow,
    pub with_scores: bool,
    pub order: SortOrder,
}

impl IntersectQuery {
    /// Sets whose weight is not exactly 1, with their weight.
    pub fn reweighted_sets(&self) -> impl Iterator<Item = (&str, f64)> {
        self.sets
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w != 1.0)
            .map(|(k, w)| (k.as_str(), *w))
    }

    pub fn has_weights(&self) -> bool {
        self.reweighted_sets().next().is_some()
    }
}
