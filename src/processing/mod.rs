//! Scoring, fallback similarity and ranking

pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod similarity;

pub use pipeline::{score_response, ScoringPipeline};
pub use ranking::{aggregate, filter_by_minimum, missing_keyword_frequencies};
pub use similarity::fallback_score;
