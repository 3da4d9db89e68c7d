//! Per-document scoring and batch orchestration.
//!
//! Each document runs extraction, prompt rendering, the model call, response
//! parsing and, when needed, fallback scoring. Documents are independent, so a
//! batch runs several at once; results are collected in submission order and
//! ranked only after every document has finished.
//!
//! Extraction and scoring are CPU-bound and run on the blocking pool, so a
//! large PDF does not hold up the model calls of the other in-flight documents.

use crate::error::{Result, RankerError};
use crate::input::{extract_pdf_text, UploadedDocument};
use crate::llm::client::ModelClient;
use crate::llm::parser::{parse, ParseStage, ParsedModelOutput};
use crate::llm::prompts::build_prompt;
use crate::processing::ranking::aggregate;
use crate::processing::record::{ResumeRecord, ScoreSource, NO_SUGGESTIONS, NO_SUMMARY};
use crate::processing::similarity::fallback_score;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task::{self, JoinError};

pub struct ScoringPipeline<C> {
    client: C,
    job_description: Arc<str>,
    concurrency: usize,
}

impl<C: ModelClient> ScoringPipeline<C> {
    pub fn new(client: C, job_description: impl Into<String>) -> Result<Self> {
        let job_description: String = job_description.into();
        if job_description.trim().is_empty() {
            return Err(RankerError::InvalidInput(
                "Job description must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client,
            job_description: Arc::from(job_description),
            concurrency: 1,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Score one document. Never fails: every problem ends up in the record.
    pub async fn score_document(&self, document: &UploadedDocument) -> ResumeRecord {
        let extraction = {
            let name = document.name.clone();
            let bytes = document.bytes.clone();
            task::spawn_blocking(move || extract_pdf_text(&name, &bytes)).await
        };
        let raw_text = match extraction {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("Skipping model scoring for {}: {}", document.name, e);
                return unreadable_record(&document.name, &e);
            }
            Err(e) => return aborted_record(&document.name, "text extraction", &e),
        };

        let prompt = build_prompt(&raw_text, &self.job_description);
        let outcome = self.client.invoke(&prompt).await;

        let name = document.name.clone();
        let job_description = Arc::clone(&self.job_description);
        let scored = task::spawn_blocking(move || match outcome {
            Ok(response) => score_response(&name, raw_text, &job_description, response),
            Err(e) => build_record(
                &name,
                raw_text,
                &job_description,
                String::new(),
                ParsedModelOutput::exhausted(),
                Some(&e),
            ),
        })
        .await;

        scored.unwrap_or_else(|e| aborted_record(&document.name, "scoring", &e))
    }

    /// Score a whole batch and rank it. Yields one record per document.
    pub async fn score_batch(&self, documents: &[UploadedDocument]) -> Vec<ResumeRecord> {
        self.score_batch_with_progress(documents, |_| {}).await
    }

    /// Like [`score_batch`](Self::score_batch), calling `on_scored` as each
    /// document finishes.
    pub async fn score_batch_with_progress<F>(
        &self,
        documents: &[UploadedDocument],
        on_scored: F,
    ) -> Vec<ResumeRecord>
    where
        F: Fn(&ResumeRecord),
    {
        info!(
            "Scoring {} documents with {} (concurrency {})",
            documents.len(),
            self.client.model_name(),
            self.concurrency
        );

        let records: Vec<ResumeRecord> = stream::iter(documents)
            .map(|document| self.score_document(document))
            .buffered(self.concurrency)
            .inspect(|record| on_scored(record))
            .collect()
            .await;

        let fallbacks = records.iter().filter(|r| r.is_fallback()).count();
        info!(
            "Scored {} documents ({} via fallback similarity)",
            records.len(),
            fallbacks
        );

        aggregate(records)
    }
}

/// Turn a raw model response into a record, falling back to text similarity
/// when the response carries no usable match percentage.
pub fn score_response(
    name: &str,
    raw_text: String,
    job_description: &str,
    raw_response: String,
) -> ResumeRecord {
    let parsed = parse(&raw_response);
    build_record(name, raw_text, job_description, raw_response, parsed, None)
}

fn build_record(
    name: &str,
    raw_text: String,
    job_description: &str,
    raw_response: String,
    parsed: ParsedModelOutput,
    model_error: Option<&RankerError>,
) -> ResumeRecord {
    let (match_percentage, score_source, diagnostic) = match parsed.match_percentage {
        Some(percentage) => (percentage, ScoreSource::ModelDerived, None),
        None => {
            let score = fallback_score(job_description, &raw_text);
            let reason = match (model_error, parsed.stage) {
                (Some(e), _) => e.to_string(),
                (None, ParseStage::Exhausted) => "model response could not be parsed".to_string(),
                (None, ParseStage::Strict | ParseStage::Extracted) => {
                    "model response had no usable match percentage".to_string()
                }
            };
            warn!("{}: {}, fallback similarity used ({:.2}%)", name, reason, score);
            (score, ScoreSource::FallbackSimilarity, Some(reason))
        }
    };

    debug!("{}: {:.2}% ({:?})", name, match_percentage, score_source);

    ResumeRecord {
        name: name.to_string(),
        raw_text,
        match_percentage,
        raw_model_response: raw_response,
        profile_summary: parsed.profile_summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
        missing_keywords: parsed.missing_keywords.unwrap_or_default(),
        suggestions: parsed.suggestions.unwrap_or_else(|| NO_SUGGESTIONS.to_string()),
        score_source,
        rank: None,
        diagnostic,
    }
}

fn unreadable_record(name: &str, error: &RankerError) -> ResumeRecord {
    let mut record = ResumeRecord::new(name, "", 0.0, ScoreSource::FallbackSimilarity);
    record.diagnostic = Some(error.to_string());
    record
}

/// Zero-score record for a document whose blocking step panicked or was cancelled.
fn aborted_record(name: &str, step: &str, error: &JoinError) -> ResumeRecord {
    warn!("{}: {} did not complete: {}", name, step, error);
    let mut record = ResumeRecord::new(name, "", 0.0, ScoreSource::FallbackSimilarity);
    record.diagnostic = Some(format!("{} did not complete: {}", step, error));
    record
}
