//! Score arithmetic shared by every backend.
//!
//! Both backends route weighting and aggregation through these helpers so
//! that a given intersection yields the same numbers whichever engine
//! computed it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OrdSetError, OrdSetResult};

/// How per-set scores of one member are combined into a single score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregate {
    #[default]
    Sum,
    Min,
    Max,
}

impl Aggregate {
    /// Fold `next` into the running aggregate `acc`.
    ///
    /// `+inf + -inf` collapses to `0.0` rather than NaN.
    pub fn combine(self, acc: f64, next: f64) -> f64 {
        match self {
            Aggregate::Sum => nan_to_zero(acc + next),
            Aggregate::Min => acc.min(next),
            Aggregate::Max => acc.max(next),
        }
    }

    /// Fold a sequence of scores; `None` when the sequence is empty.
    pub fn fold<I: IntoIterator<Item = f64>>(self, scores: I) -> Option<f64> {
        let mut iter = scores.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, s| self.combine(acc, s)))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregate {
    type Err = OrdSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUM" => Ok(Aggregate::Sum),
            "MIN" => Ok(Aggregate::Min),
            "MAX" => Ok(Aggregate::Max),
            other => Err(OrdSetError::invalid_argument(
                "aggregate",
                format!("expected SUM, MIN or MAX, got '{other}'"),
            )),
        }
    }
}

/// Direction of a ranked read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn is_descending(self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// Multiply a score by a set weight.
///
/// `inf * 0` collapses to `0.0` rather than NaN.
pub fn weighted(score: f64, weight: f64) -> f64 {
    nan_to_zero(score * weight)
}

fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// One end of a score interval. Both ends are inclusive.
///
/// Parses from the sentinel tokens `-inf`, `+inf` (or `inf`) and from any
/// decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBound(f64);

impl ScoreBound {
    pub const NEG_INF: ScoreBound = ScoreBound(f64::NEG_INFINITY);
    pub const POS_INF: ScoreBound = ScoreBound(f64::INFINITY);

    /// # Errors
    ///
    /// `InvalidArgument` for NaN.
    pub fn new(value: f64) -> OrdSetResult<Self> {
        if value.is_nan() {
            return Err(OrdSetError::invalid_argument(
                "bound",
                "NaN is not a valid score bound",
            ));
        }
        Ok(ScoreBound(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_unbounded(self) -> bool {
        self.0.is_infinite()
    }
}

impl FromStr for ScoreBound {
    type Err = OrdSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "-inf" => Ok(ScoreBound::NEG_INF),
            "+inf" | "inf" => Ok(ScoreBound::POS_INF),
            other => {
                let value: f64 = other.parse().map_err(|_| {
                    OrdSetError::invalid_argument("bound", format!("'{other}' is not a number"))
                })?;
                ScoreBound::new(value)
            }
        }
    }
}

impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::NEG_INFINITY {
            f.write_str("-inf")
        } else if self.0 == f64::INFINITY {
            f.write_str("+inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Inclusive score interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: ScoreBound,
    pub max: ScoreBound,
}

impl ScoreRange {
    pub fn new(min: ScoreBound, max: ScoreBound) -> Self {
        Self { min, max }
    }

    /// The whole score line.
    pub fn all() -> Self {
        Self::new(ScoreBound::NEG_INF, ScoreBound::POS_INF)
    }

    /// Parse both ends from strings such as `"-inf"`, `"10"`, `"+inf"`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if either end is not a number or sentinel.
    pub fn parse(min: &str, max: &str) -> OrdSetResult<Self> {
        Ok(Self::new(min.parse()?, max.parse()?))
    }

    /// Build from numbers; NaN is rejected.
    pub fn from_f64(min: f64, max: f64) -> OrdSetResult<Self> {
        Ok(Self::new(ScoreBound::new(min)?, ScoreBound::new(max)?))
    }

    pub fn contains(&self, score: f64) -> bool {
        self.min.0 <= score && score <= self.max.0
    }

    /// True when no score can fall inside the interval.
    pub fn is_empty(&self) -> bool {
        self.min.0 > self.max.0
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_fold() {
        let scores = [3.0, 1.0, 2.0];
        assert_eq!(Aggregate::Sum.fold(scores), Some(6.0));
        assert_eq!(Aggregate::Min.fold(scores), Some(1.0));
        assert_eq!(Aggregate::Max.fold(scores), Some(3.0));
        assert_eq!(Aggregate::Sum.fold(std::iter::empty()), None);
    }

    #[test]
    fn test_infinite_sum_collapses_to_zero() {
        assert_eq!(Aggregate::Sum.combine(f64::INFINITY, f64::NEG_INFINITY), 0.0);
        assert_eq!(weighted(f64::INFINITY, 0.0), 0.0);
        assert_eq!(weighted(2.0, 3.0), 6.0);
    }

    #[test]
    fn test_aggregate_parse() {
        assert_eq!("sum".parse::<Aggregate>().unwrap(), Aggregate::Sum);
        assert_eq!("Max".parse::<Aggregate>().unwrap(), Aggregate::Max);
        assert!("avg".parse::<Aggregate>().is_err());
    }

    #[test]
    fn test_bound_parse() {
        assert_eq!("-inf".parse::<ScoreBound>().unwrap(), ScoreBound::NEG_INF);
        assert_eq!("+inf".parse::<ScoreBound>().unwrap(), ScoreBound::POS_INF);
        assert_eq!("2.5".parse::<ScoreBound>().unwrap().value(), 2.5);
        assert!("NaN".parse::<ScoreBound>().is_err());
        assert!("ten".parse::<ScoreBound>().is_err());
    }

    #[test]
    fn test_range_contains_inclusive() {
        let range = ScoreRange::parse("1", "3").unwrap();
        assert!(range.contains(1.0));
        assert!(range.contains(3.0));
        assert!(!range.contains(3.5));
        assert!(ScoreRange::all().contains(f64::NEG_INFINITY));
        assert!(ScoreRange::parse("+inf", "-inf").unwrap().is_empty());
        assert_eq!(range.to_string(), "[1, 3]");
    }
}
