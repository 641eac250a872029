//! The ordered-set facade.
//!
//! [`SortedSets`] is the single public entry point. It is bound to exactly
//! one [`SortedSetBackend`] when constructed and never switches. Each call:
//!
//! 1. canonicalizes members through the codec,
//! 2. applies defaults and the empty-input no-op rules,
//! 3. builds an immutable query value,
//! 4. delegates to the backend and returns its result unchanged.
//!
//! No state is cached between calls; every operation is one or more round
//! trips to the bound store.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::codec::Member;
use crate::error::{OrdSetError, OrdSetResult};
use crate::traits::{BackendKind, RangeQuery, ScoreRangeQuery, SortedSetBackend};
use crate::types::{
    IntersectParams, KeySet, MemberSet, RankWindow, RankedMembers, ScoreRange, ScoredMember,
    SortOrder,
};

/// Backend-agnostic ordered-set operations.
///
/// Cloning is cheap and clones share the bound backend.
#[derive(Clone)]
pub struct SortedSets {
    backend: Arc<dyn SortedSetBackend>,
}

impl std::fmt::Debug for SortedSets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedSets")
            .field("backend", &self.backend.kind())
            .finish()
    }
}

impl SortedSets {
    /// Bind the facade to a backend.
    pub fn new(backend: Arc<dyn SortedSetBackend>) -> Self {
        info!(backend = %backend.kind(), "Ordered-set facade bound to backend");
        Self { backend }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn backend(&self) -> &Arc<dyn SortedSetBackend> {
        &self.backend
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Add or re-score one member. An empty key is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `score` is NaN.
    pub async fn add(&self, key: &str, score: f64, member: impl Into<Member>) -> OrdSetResult<()> {
        self.add_many(key, [(score, member.into())]).await
    }

    /// Add or re-score several members of one set.
    pub async fn add_many<M, I>(&self, key: &str, entries: I) -> OrdSetResult<()>
    where
        M: Into<Member>,
        I: IntoIterator<Item = (f64, M)>,
    {
        if key.is_empty() {
            return Ok(());
        }
        let entries = entries
            .into_iter()
            .map(|(score, member)| -> OrdSetResult<ScoredMember> {
                Ok(ScoredMember::new(member.into().canonical(), check_score(score)?))
            })
            .collect::<OrdSetResult<Vec<_>>>()?;
        if entries.is_empty() {
            return Ok(());
        }
        debug!(key, count = entries.len(), "add");
        self.backend.add(key, &entries).await
    }

    /// Add one member with one score to every named set.
    pub async fn sets_add(
        &self,
        keys: impl Into<KeySet>,
        score: f64,
        member: impl Into<Member>,
    ) -> OrdSetResult<()> {
        let keys = keys.into();
        if keys.is_empty() {
            return Ok(());
        }
        let score = check_score(score)?;
        let member = member.into().canonical();
        debug!(keys = keys.len(), member = %member, "sets_add");
        self.backend.sets_add(keys.as_slice(), score, &member).await
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove one or many members from one or many sets.
    ///
    /// Returns immediately when either the key selection or the member
    /// selection is empty.
    #[instrument(skip_all, level = "debug")]
    pub async fn remove(
        &self,
        keys: impl Into<KeySet>,
        members: impl Into<MemberSet>,
    ) -> OrdSetResult<()> {
        let keys = keys.into();
        if keys.is_empty() {
            return Ok(());
        }
        let members = members.into();
        if members.is_empty() {
            return Ok(());
        }
        debug!(keys = keys.len(), members = members.len(), "remove");
        self.backend
            .remove(keys.as_slice(), members.as_slice())
            .await
    }

    /// Remove one member from every named set. No-op on an empty key list
    /// or an empty member.
    pub async fn sets_remove(
        &self,
        keys: impl Into<KeySet>,
        member: impl Into<Member>,
    ) -> OrdSetResult<()> {
        let keys = keys.into();
        if keys.is_empty() {
            return Ok(());
        }
        let member = member.into().canonical();
        if member.is_empty() {
            return Ok(());
        }
        debug!(keys = keys.len(), member = %member, "sets_remove");
        self.backend
            .remove_from_sets(keys.as_slice(), &member)
            .await
    }

    /// Remove every entry scored within `range` from every named set.
    ///
    /// ```rust,no_run
    /// # async fn demo(sets: ordset_core::SortedSets) -> ordset_core::OrdSetResult<()> {
    /// use ordset_core::types::ScoreRange;
    ///
    /// // Empties both sets.
    /// sets.sets_remove_range_by_score(["a", "b"], ScoreRange::parse("-inf", "+inf")?)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn sets_remove_range_by_score(
        &self,
        keys: impl Into<KeySet>,
        range: ScoreRange,
    ) -> OrdSetResult<()> {
        let keys = keys.into();
        if keys.is_empty() {
            return Ok(());
        }
        debug!(keys = keys.len(), range = %range, "sets_remove_range_by_score");
        self.backend
            .remove_range_by_score(keys.as_slice(), range)
            .await
    }

    // =========================================================================
    // Ranked reads
    // =========================================================================

    /// Members ranked `start..=stop` by ascending score.
    pub async fn range(&self, key: &str, start: usize, stop: i64) -> OrdSetResult<Vec<String>> {
        self.ranked(key, start, stop, SortOrder::Ascending)
            .await
            .map(into_values)
    }

    /// Members ranked `start..=stop` by descending score.
    pub async fn rev_range(&self, key: &str, start: usize, stop: i64) -> OrdSetResult<Vec<String>> {
        self.ranked(key, start, stop, SortOrder::Descending)
            .await
            .map(into_values)
    }

    pub async fn range_with_scores(
        &self,
        key: &str,
        start: usize,
        stop: i64,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        self.ranked(key, start, stop, SortOrder::Ascending).await
    }

    pub async fn rev_range_with_scores(
        &self,
        key: &str,
        start: usize,
        stop: i64,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        self.ranked(key, start, stop, SortOrder::Descending).await
    }

    async fn ranked(
        &self,
        key: &str,
        start: usize,
        stop: i64,
        order: SortOrder,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        let window = RankWindow::new(start, stop);
        if key.is_empty() || window.is_empty() {
            return Ok(Vec::new());
        }
        self.backend.range(key, RangeQuery::new(window, order)).await
    }

    /// Members scored within `range`, ascending, paged by `offset`/`count`.
    pub async fn range_by_score(
        &self,
        key: &str,
        offset: usize,
        count: Option<usize>,
        range: ScoreRange,
    ) -> OrdSetResult<Vec<String>> {
        self.by_score(key, offset, count, range, SortOrder::Ascending)
            .await
            .map(into_values)
    }

    /// Members scored within `range`, descending, paged by `offset`/`count`.
    pub async fn rev_range_by_score(
        &self,
        key: &str,
        offset: usize,
        count: Option<usize>,
        range: ScoreRange,
    ) -> OrdSetResult<Vec<String>> {
        self.by_score(key, offset, count, range, SortOrder::Descending)
            .await
            .map(into_values)
    }

    pub async fn rev_range_by_score_with_scores(
        &self,
        key: &str,
        offset: usize,
        count: Option<usize>,
        range: ScoreRange,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        self.by_score(key, offset, count, range, SortOrder::Descending)
            .await
    }

    async fn by_score(
        &self,
        key: &str,
        offset: usize,
        count: Option<usize>,
        range: ScoreRange,
        order: SortOrder,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        if key.is_empty() || count == Some(0) || range.is_empty() {
            return Ok(Vec::new());
        }
        let query = ScoreRangeQuery::new(range, order).page(offset, count);
        self.backend.range_by_score(key, query).await
    }

    /// Number of members in a set; 0 for a missing set or empty key.
    pub async fn card(&self, key: &str) -> OrdSetResult<u64> {
        if key.is_empty() {
            return Ok(0);
        }
        self.backend.card(key).await
    }

    /// Score of a member, `None` if absent.
    pub async fn score(&self, key: &str, member: impl Into<Member>) -> OrdSetResult<Option<f64>> {
        if key.is_empty() {
            return Ok(None);
        }
        let member = member.into().canonical();
        self.backend.score(key, &member).await
    }

    // =========================================================================
    // Intersection
    // =========================================================================

    /// Weighted intersection ranked in `params.order`.
    ///
    /// Empty `sets` and empty windows return an empty result without a
    /// round trip.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for duplicate sets, surplus or NaN weights.
    #[instrument(skip_all, fields(sets = params.sets.len()), level = "debug")]
    pub async fn intersect(&self, params: IntersectParams) -> OrdSetResult<RankedMembers> {
        let with_scores = params.with_scores;
        let Some(query) = params.normalize()? else {
            return Ok(RankedMembers::empty(with_scores));
        };
        if query.window.is_empty() {
            debug!("intersect: empty window");
            return Ok(RankedMembers::empty(with_scores));
        }
        debug!(
            aggregate = %query.aggregate,
            weighted = query.has_weights(),
            order = ?query.order,
            "intersect"
        );
        self.backend.intersect(&query).await
    }

    /// [`SortedSets::intersect`] ranked by descending score.
    pub async fn rev_intersect(&self, params: IntersectParams) -> OrdSetResult<RankedMembers> {
        self.intersect(params.order(SortOrder::Descending)).await
    }

    /// Number of members present in every named set; 0 for no sets.
    pub async fn intersect_card(&self, keys: impl Into<KeySet>) -> OrdSetResult<u64> {
        let keys = keys.into();
        if keys.is_empty() {
            return Ok(0);
        }
        debug!(keys = keys.len(), "intersect_card");
        self.backend.intersect_card(keys.as_slice()).await
    }
}

fn check_score(score: f64) -> OrdSetResult<f64> {
    if score.is_nan() {
        return Err(OrdSetError::invalid_argument("score", "NaN is not a valid score"));
    }
    Ok(score)
}

fn into_values(entries: Vec<ScoredMember>) -> Vec<String> {
    entries.into_iter().map(|e| e.value).collect()
}
