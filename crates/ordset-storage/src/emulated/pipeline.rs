//! Aggregation pipelines over row documents.
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s. The first stage is
//! always a `Match`, which collections use to choose the rows to feed in;
//! [`Pipeline::evaluate`] then runs every stage, the `Match` included, over
//! those documents.
//!
//! Intersection is expressed as:
//!
//! ```text
//! Match(keys) -> Reweight -> Group(aggregate) -> MatchCount(n) -> Sort -> Skip -> Limit -> Project
//! ```
//!
//! and its cardinality as the same pipeline cut after `MatchCount`, followed
//! by `Count`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use ordset_core::error::{OrdSetError, OrdSetResult};
use ordset_core::types::{weighted, Aggregate, Entry, RankWindow, ScoredMember, SortOrder};

use super::row::RowFilter;

/// A document flowing through a pipeline.
///
/// Rows enter with `key`, `value` (the member) and `score` set. Stages may
/// drop fields: `Group` drops `key`, `Project` may drop `score`, `Count`
/// keeps only `count`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub key: Option<String>,
    pub value: Option<String>,
    pub score: Option<f64>,
    /// Rows folded into this document by `Group`, or the total for `Count`.
    pub count: u64,
}

impl From<Entry> for Document {
    fn from(entry: Entry) -> Self {
        Self {
            key: Some(entry.key),
            value: Some(entry.member),
            score: Some(entry.score),
            count: 1,
        }
    }
}

impl Document {
    fn require_value(&self, stage: &str) -> OrdSetResult<&str> {
        self.value
            .as_deref()
            .ok_or_else(|| missing_field(stage, "value"))
    }

    fn require_score(&self, stage: &str) -> OrdSetResult<f64> {
        self.score.ok_or_else(|| missing_field(stage, "score"))
    }

    /// Member and score, for documents that still carry both.
    pub fn into_scored(self) -> OrdSetResult<ScoredMember> {
        let score = self.require_score("output")?;
        match self.value {
            Some(value) => Ok(ScoredMember::new(value, score)),
            None => Err(missing_field("output", "value")),
        }
    }

    /// Member only.
    pub fn into_value(self) -> OrdSetResult<String> {
        self.value.ok_or_else(|| missing_field("output", "value"))
    }
}

fn missing_field(stage: &str, field: &str) -> OrdSetError {
    OrdSetError::invalid_argument(
        "pipeline",
        format!("{stage} stage needs documents with a '{field}' field"),
    )
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep rows admitted by the filter.
    Match(RowFilter),
    /// Multiply the score of rows from the listed keys by their weight.
    /// Weights of exactly 1 are skipped.
    Reweight(Vec<(String, f64)>),
    /// Group by member, folding scores in arrival order and counting rows.
    Group(Aggregate),
    /// Keep groups whose row count equals `n`.
    MatchCount(u64),
    /// Sort by score, then member; `Descending` is the exact reverse.
    Sort(SortOrder),
    Skip(usize),
    Limit(usize),
    /// Replace the input with one document holding its length, or with
    /// nothing when the input is empty.
    Count,
    /// Shape output documents: drop `key`, and `score` unless kept.
    Project { with_scores: bool },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::Reweight(_) => "reweight",
            Stage::Group(_) => "group",
            Stage::MatchCount(_) => "match_count",
            Stage::Sort(_) => "sort",
            Stage::Skip(_) => "skip",
            Stage::Limit(_) => "limit",
            Stage::Count => "count",
            Stage::Project { .. } => "project",
        }
    }

    fn apply(&self, docs: Vec<Document>) -> OrdSetResult<Vec<Document>> {
        let stage = self.name();
        match self {
            Stage::Match(filter) => {
                let mut kept = Vec::with_capacity(docs.len());
                for doc in docs {
                    let key_ok = match &doc.key {
                        Some(k) => filter.key_list().contains(k),
                        None => false,
                    };
                    if key_ok && filter.admits(doc.require_value(stage)?, doc.require_score(stage)?) {
                        kept.push(doc);
                    }
                }
                Ok(kept)
            }
            Stage::Reweight(weights) => docs
                .into_iter()
                .map(|mut doc| -> OrdSetResult<Document> {
                    let key = doc.key.as_deref().ok_or_else(|| missing_field(stage, "key"))?;
                    if let Some((_, w)) = weights.iter().find(|(k, w)| k == key && *w != 1.0) {
                        let score = doc.require_score(stage)?;
                        doc.score = Some(weighted(score, *w));
                    }
                    Ok(doc)
                })
                .collect(),
            Stage::Group(aggregate) => {
                let mut groups: BTreeMap<String, (f64, u64)> = BTreeMap::new();
                for doc in docs {
                    let score = doc.require_score(stage)?;
                    let value = doc.value.ok_or_else(|| missing_field(stage, "value"))?;
                    groups
                        .entry(value)
                        .and_modify(|(acc, n)| {
                            *acc = aggregate.combine(*acc, score);
                            *n += doc.count;
                        })
                        .or_insert((score, doc.count));
                }
                Ok(groups
                    .into_iter()
                    .map(|(value, (score, count))| Document {
                        key: None,
                        value: Some(value),
                        score: Some(score),
                        count,
                    })
                    .collect())
            }
            Stage::MatchCount(n) => Ok(docs.into_iter().filter(|d| d.count == *n).collect()),
            Stage::Sort(order) => {
                let mut keyed = Vec::with_capacity(docs.len());
                for doc in docs {
                    let score = OrderedFloat(doc.require_score(stage)?);
                    keyed.push((score, doc));
                }
                keyed.sort_by(|(sa, a), (sb, b)| match sa.cmp(sb) {
                    Ordering::Equal => a.value.cmp(&b.value),
                    other => other,
                });
                if order.is_descending() {
                    keyed.reverse();
                }
                Ok(keyed.into_iter().map(|(_, doc)| doc).collect())
            }
            Stage::Skip(n) => Ok(docs.into_iter().skip(*n).collect()),
            Stage::Limit(n) => Ok(docs.into_iter().take(*n).collect()),
            Stage::Count => {
                if docs.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(vec![Document {
                    count: docs.len() as u64,
                    ..Default::default()
                }])
            }
            Stage::Project { with_scores } => Ok(docs
                .into_iter()
                .map(|mut doc| {
                    doc.key = None;
                    if !with_scores {
                        doc.score = None;
                    }
                    doc
                })
                .collect()),
        }
    }
}

/// An aggregation pipeline, always led by a `Match`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    source: RowFilter,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Start a pipeline over the rows `filter` selects.
    pub fn matching(filter: RowFilter) -> Self {
        Self {
            source: filter.clone(),
            stages: vec![Stage::Match(filter)],
        }
    }

    /// The leading filter, used by collections to choose input rows.
    pub fn source(&self) -> &RowFilter {
        &self.source
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append `Skip`/`Limit` for a rank window, omitting no-op stages.
    pub fn window(mut self, window: RankWindow) -> Self {
        if window.start() > 0 {
            self.stages.push(Stage::Skip(window.start()));
        }
        if let Some(limit) = window.limit() {
            self.stages.push(Stage::Limit(limit));
        }
        self
    }

    /// Run every stage in order.
    pub fn evaluate(&self, docs: Vec<Document>) -> OrdSetResult<Vec<Document>> {
        self.stages
            .iter()
            .try_fold(docs, |docs, stage| stage.apply(docs))
    }
}
