//! Domain types for ordered sets.
//!
//! - [`Entry`], [`ScoredMember`], [`RankedMembers`]: stored and returned data
//! - [`Aggregate`], [`SortOrder`], [`ScoreBound`], [`ScoreRange`]: score semantics
//! - [`RankWindow`]: `start`/`stop` windows over ranked results
//! - [`KeySet`], [`MemberSet`], [`IntersectParams`], [`IntersectQuery`]: call parameters

mod entry;
mod params;
mod score;
mod window;

pub use entry::{Entry, RankedMembers, ScoredMember};
pub use params::{IntersectParams, IntersectQuery, KeySet, MemberSet};
pub use score::{weighted, Aggregate, ScoreBound, ScoreRange, SortOrder};
pub use window::RankWindow;
