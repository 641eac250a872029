//! Backend contract for ordered sets.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OrdSetResult;
use crate::types::{IntersectQuery, RankWindow, RankedMembers, ScoreRange, ScoredMember, SortOrder};

// =========================================================================
// Backend Types
// =========================================================================

/// Which backend family implements the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Ranked-collection commands issued per physical key.
    #[default]
    Native,
    /// Pipelines over one flat `(key, member, score)` row collection.
    Emulated,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => f.write_str("native"),
            BackendKind::Emulated => f.write_str("emulated"),
        }
    }
}

/// A rank-window read of one set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeQuery {
    pub window: RankWindow,
    pub order: SortOrder,
}

impl RangeQuery {
    pub fn new(window: RankWindow, order: SortOrder) -> Self {
        Self { window, order }
    }
}

/// A score-interval read of one set, paged by `offset`/`count`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRangeQuery {
    pub range: ScoreRange,
    pub order: SortOrder,
    pub offset: usize,
    /// `None` returns everything after `offset`.
    pub count: Option<usize>,
}

impl ScoreRangeQuery {
    pub fn new(range: ScoreRange, order: SortOrder) -> Self {
        Self {
            range,
            order,
            offset: 0,
            count: None,
        }
    }

    pub fn page(mut self, offset: usize, count: Option<usize>) -> Self {
        self.offset = offset;
        self.count = count;
        self
    }
}

// =========================================================================
// Backend Trait
// =========================================================================

/// One storage engine's implementation of the ordered-set operations.
///
/// The facade applies every default and no-op rule before delegating, so
/// implementations may assume:
///
/// - key slices are non-empty
/// - members are already canonical strings
/// - scores and bounds are not NaN
/// - an [`IntersectQuery`] names distinct sets and carries one weight per set
///
/// Whatever the engine, ranked reads order by score and break ties by
/// member string, ascending; a descending read is the exact reverse of the
/// ascending one.
///
/// # Errors
///
/// Store failures surface unchanged as `StoreUnavailable` or
/// `StoreOperationFailed`. Nothing is retried.
#[async_trait]
pub trait SortedSetBackend: Send + Sync {
    /// Backend family, fixed for the lifetime of the value.
    fn kind(&self) -> BackendKind;

    /// Upsert members of one set. Re-adding a member overwrites its score.
    async fn add(&self, key: &str, entries: &[ScoredMember]) -> OrdSetResult<()>;

    /// Upsert one member with one score into every named set.
    async fn sets_add(&self, keys: &[String], score: f64, member: &str) -> OrdSetResult<()>;

    /// Remove every listed member from every listed set.
    async fn remove(&self, keys: &[String], members: &[String]) -> OrdSetResult<()>;

    /// Remove one member from every listed set.
    async fn remove_from_sets(&self, keys: &[String], member: &str) -> OrdSetResult<()>;

    /// Remove every entry of every listed set whose score lies in `range`.
    async fn remove_range_by_score(&self, keys: &[String], range: ScoreRange) -> OrdSetResult<()>;

    /// Ranked window of one set, with scores.
    async fn range(&self, key: &str, query: RangeQuery) -> OrdSetResult<Vec<ScoredMember>>;

    /// Entries of one set within a score interval, with scores.
    async fn range_by_score(
        &self,
        key: &str,
        query: ScoreRangeQuery,
    ) -> OrdSetResult<Vec<ScoredMember>>;

    /// Number of members in one set.
    async fn card(&self, key: &str) -> OrdSetResult<u64>;

    /// Score of one member, `None` if absent.
    async fn score(&self, key: &str, member: &str) -> OrdSetResult<Option<f64>>;

    /// Weighted intersection: reweight, keep members present in every set,
    /// aggregate, sort, window, project.
    async fn intersect(&self, query: &IntersectQuery) -> OrdSetResult<RankedMembers>;

    /// Number of members present in every listed set.
    async fn intersect_card(&self, keys: &[String]) -> OrdSetResult<u64>;
}
