//! Per-resume result record

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_SUMMARY: &str = "No summary found";
pub const NO_SUGGESTIONS: &str = "No suggestions provided.";

/// Where a record's match percentage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreSource {
    ModelDerived,
    FallbackSimilarity,
}

impl fmt::Display for ScoreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreSource::ModelDerived => write!(f, "Model"),
            ScoreSource::FallbackSimilarity => write!(f, "Fallback"),
        }
    }
}

/// Coarse grouping of match percentages for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBand {
    Strong,
    Good,
    Weak,
}

impl MatchBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 85.0 {
            MatchBand::Strong
        } else if percentage >= 70.0 {
            MatchBand::Good
        } else {
            MatchBand::Weak
        }
    }
}

impl fmt::Display for MatchBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchBand::Strong => write!(f, "STRONG"),
            MatchBand::Good => write!(f, "GOOD"),
            MatchBand::Weak => write!(f, "WEAK"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub name: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_text: String,
    pub match_percentage: f64,
    pub raw_model_response: String,
    pub profile_summary: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: String,
    pub score_source: ScoreSource,
    /// Set by the ranking step; `None` until the whole batch is scored.
    pub rank: Option<usize>,
    /// Why the fallback path was taken, when it was.
    pub diagnostic: Option<String>,
}

impl ResumeRecord {
    /// A record with default feedback fields and no rank yet.
    pub fn new(
        name: impl Into<String>,
        raw_text: impl Into<String>,
        match_percentage: f64,
        score_source: ScoreSource,
    ) -> Self {
        Self {
            name: name.into(),
            raw_text: raw_text.into(),
            match_percentage,
            raw_model_response: String::new(),
            profile_summary: NO_SUMMARY.to_string(),
            missing_keywords: Vec::new(),
            suggestions: NO_SUGGESTIONS.to_string(),
            score_source,
            rank: None,
            diagnostic: None,
        }
    }

    pub fn band(&self) -> MatchBand {
        MatchBand::from_percentage(self.match_percentage)
    }

    pub fn is_fallback(&self) -> bool {
        self.score_source == ScoreSource::FallbackSimilarity
    }
}
