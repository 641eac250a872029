//! [`SortedSetBackend`] over a [`RowCollection`].
//!
//! Writes are upserts and filtered deletes; multi-key deletes are one
//! `delete_many` with a key list, so they never need batching. Every read,
//! intersections included, is an aggregation pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use ordset_core::error::OrdSetResult;
use ordset_core::traits::{BackendKind, RangeQuery, ScoreRangeQuery, SortedSetBackend};
use ordset_core::types::{Aggregate, Entry, IntersectQuery, RankedMembers, ScoreRange, ScoredMember};

use super::collection::RowCollection;
use super::pipeline::{Document, Pipeline, Stage};
use super::row::RowFilter;

/// Emulated ordered-set backend.
pub struct EmulatedSortedSetBackend<C> {
    collection: Arc<C>,
}

impl<C> std::fmt::Debug for EmulatedSortedSetBackend<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulatedSortedSetBackend").finish_non_exhaustive()
    }
}

impl<C: RowCollection> EmulatedSortedSetBackend<C> {
    pub fn new(collection: Arc<C>) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Arc<C> {
        &self.collection
    }

    /// `Match -> Reweight -> Group -> MatchCount`: members present in every
    /// set with their combined score.
    fn common_members(filter: RowFilter, reweight: Vec<(String, f64)>, aggregate: Aggregate) -> Pipeline {
        let n = filter.key_list().len() as u64;
        let mut pipeline = Pipeline::matching(filter);
        if !reweight.is_empty() {
            pipeline = pipeline.then(Stage::Reweight(reweight));
        }
        pipeline
            .then(Stage::Group(aggregate))
            .then(Stage::MatchCount(n))
    }

    async fn scored(&self, pipeline: Pipeline) -> OrdSetResult<Vec<ScoredMember>> {
        self.collection
            .aggregate(pipeline.then(Stage::Project { with_scores: true }))
            .await?
            .into_iter()
            .map(Document::into_scored)
            .collect()
    }

    async fn count(&self, pipeline: Pipeline) -> OrdSetResult<u64> {
        let docs = self.collection.aggregate(pipeline.then(Stage::Count)).await?;
        Ok(docs.first().map_or(0, |d| d.count))
    }
}

#[async_trait]
impl<C: RowCollection + 'static> SortedSetBackend for EmulatedSortedSetBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Emulated
    }

    async fn add(&self, key: &str, entries: &[ScoredMember]) -> OrdSetResult<()> {
        let rows = entries
            .iter()
            .map(|e| Entry::new(key, e.value.clone(), e.score))
            .collect();
        self.collection.upsert_many(rows).await?;
        Ok(())
    }

    async fn sets_add(&self, keys: &[String], score: f64, member: &str) -> OrdSetResult<()> {
        let rows = keys
            .iter()
            .map(|key| Entry::new(key.clone(), member, score))
            .collect();
        self.collection.upsert_many(rows).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[String], members: &[String]) -> OrdSetResult<()> {
        let filter = RowFilter::keys(keys.iter().cloned()).members(members.iter().cloned());
        let removed = self.collection.delete_many(filter).await?;
        debug!(removed, "remove");
        Ok(())
    }

    async fn remove_from_sets(&self, keys: &[String], member: &str) -> OrdSetResult<()> {
        let filter = RowFilter::keys(keys.iter().cloned()).members([member]);
        self.collection.delete_many(filter).await?;
        Ok(())
    }

    async fn remove_range_by_score(&self, keys: &[String], range: ScoreRange) -> OrdSetResult<()> {
        let filter = RowFilter::keys(keys.iter().cloned()).score(range);
        self.collection.delete_many(filter).await?;
        Ok(())
    }

    async fn range(&self, key: &str, query: RangeQuery) -> OrdSetResult<Vec<ScoredMember>> {
        let pipeline = Pipeline::matching(RowFilter::key(key))
            .then(Stage::Sort(query.order))
            .window(query.window);
        self.scored(pipeline).await
    }

    async fn range_by_score(
        &self,
        key: &str,
        query: ScoreRangeQuery,
    ) -> OrdSetResult<Vec<ScoredMember>> {
        let mut pipeline = Pipeline::matching(RowFilter::key(key).score(query.range))
            .then(Stage::Sort(query.order));
        if query.offset > 0 {
            pipeline = pipeline.then(Stage::Skip(query.offset));
        }
        if let Some(count) = query.count {
            pipeline = pipeline.then(Stage::Limit(count));
        }
        self.scored(pipeline).await
    }

    async fn card(&self, key: &str) -> OrdSetResult<u64> {
        self.count(Pipeline::matching(RowFilter::key(key))).await
    }

    async fn score(&self, key: &str, member: &str) -> OrdSetResult<Option<f64>> {
        let docs = self
            .collection
            .aggregate(Pipeline::matching(RowFilter::key(key).members([member])))
            .await?;
        Ok(docs.into_iter().next().and_then(|d| d.score))
    }

    #[instrument(skip_all, fields(sets = query.sets.len()), level = "debug")]
    async fn intersect(&self, query: &IntersectQuery) -> OrdSetResult<RankedMembers> {
        let reweight = query
            .reweighted_sets()
            .map(|(k, w)| (k.to_string(), w))
            .collect();
        let pipeline = Self::common_members(
            RowFilter::keys(query.sets.iter().cloned()),
            reweight,
            query.aggregate,
        )
        .then(Stage::Sort(query.order))
        .window(query.window)
        .then(Stage::Project {
            with_scores: query.with_scores,
        });

        let docs = self.collection.aggregate(pipeline).await?;
        debug!(results = docs.len(), "intersect");
        if query.with_scores {
            let entries = docs
                .into_iter()
                .map(Document::into_scored)
                .collect::<OrdSetResult<Vec<_>>>()?;
            Ok(RankedMembers::WithScores(entries))
        } else {
            let members = docs
                .into_iter()
                .map(Document::into_value)
                .collect::<OrdSetResult<Vec<_>>>()?;
            Ok(RankedMembers::Members(members))
        }
    }

    async fn intersect_card(&self, keys: &[String]) -> OrdSetResult<u64> {
        let pipeline = Self::common_members(
            RowFilter::keys(keys.iter().cloned()),
            Vec::new(),
            Aggregate::Sum,
        );
        self.count(pipeline).await
    }
}
