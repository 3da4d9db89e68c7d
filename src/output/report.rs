//! Batch report handed to the formatters

use crate::processing::ranking::{filter_by_minimum, missing_keyword_frequencies};
use crate::processing::record::{ResumeRecord, ScoreSource};
use serde::{Deserialize, Serialize};

/// Ranked results of one batch plus the context needed to present them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Ranked records, best match first.
    pub records: Vec<ResumeRecord>,
    /// Threshold used for the filtered view and the export.
    pub min_match: f64,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub ranker_version: String,
    pub model_used: String,
    pub processing_time_ms: u64,
}

/// The exportable projection of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub name: String,
    /// `None` for a record that never went through ranking.
    pub rank: Option<usize>,
    pub match_percentage: f64,
    pub source: String,
}

impl From<&ResumeRecord> for ExportRow {
    fn from(record: &ResumeRecord) -> Self {
        Self {
            name: record.name.clone(),
            rank: record.rank,
            match_percentage: record.match_percentage,
            source: record.score_source.to_string(),
        }
    }
}

impl BatchReport {
    pub fn new(records: Vec<ResumeRecord>, min_match: f64, model_used: &str, processing_time_ms: u64) -> Self {
        Self {
            records,
            min_match,
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now(),
                ranker_version: env!("CARGO_PKG_VERSION").to_string(),
                model_used: model_used.to_string(),
                processing_time_ms,
            },
        }
    }

    pub fn filtered(&self) -> Vec<&ResumeRecord> {
        filter_by_minimum(&self.records, self.min_match)
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.filtered().into_iter().map(ExportRow::from).collect()
    }

    pub fn common_missing_keywords(&self) -> Vec<(String, usize)> {
        missing_keyword_frequencies(&self.records)
    }

    /// Record counts per ten-point band: `[0, 10)`, `[10, 20)` ... `[90, 100]`.
    pub fn distribution(&self) -> [usize; 10] {
        let mut buckets = [0usize; 10];
        for record in &self.records {
            let index = (record.match_percentage.clamp(0.0, 100.0) / 10.0).floor() as usize;
            buckets[index.min(9)] += 1;
        }
        buckets
    }

    pub fn fallback_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.score_source == ScoreSource::FallbackSimilarity)
            .count()
    }
}
