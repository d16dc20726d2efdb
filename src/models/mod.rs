//! Data models for walls, layers, pre-filters, requirement profiles and match results.
//!
//! Models are independent of transport and session orchestration.

pub mod catalog;
pub mod lignum;
pub mod matching;
pub mod pre_filter;
pub mod ranking;
pub mod requirement;
pub mod staged;

// Re-export all model types
pub use catalog::{bauteil_typ, Layer, LayerSet, LayersResponse, ThicknessRange, Variant};
pub use lignum::LignumRecord;
pub use matching::{
    Bucket, Classification, ClassifiedResultSet, Combination, MatchRequest, MatchResponse,
    Performance, RawCombination,
};
pub use pre_filter::{canonical_selection, PreFilter, PreFilterRequest};
pub use ranking::{PriorityRanking, RankCriterion, MAX_RANK, MIN_RANK};
pub use requirement::{ComparisonOp, Criterion, CriterionField, Metric, RequirementProfile, Sampling};
pub use staged::Staged;
