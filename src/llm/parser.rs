//! Salvaging structured fields from raw model output.
//!
//! Model output is not guaranteed to be well formed. Parsing runs as a chain of
//! decode stages, each returning a [`DecodeOutcome`]; the first stage that
//! decodes wins. When no stage decodes, the result has every field absent,
//! which is a distinct state from the model scoring a resume at 0%.
//!
//! [`parse`] never fails.

use crate::llm::prompts::{
    FIELD_MATCH, FIELD_MISSING_KEYWORDS, FIELD_PROFILE_SUMMARY, FIELD_SUGGESTIONS,
};
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Which decode stage produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// The whole response was one JSON object.
    Strict,
    /// An object was found embedded in surrounding text.
    Extracted,
    /// Nothing decodable was found.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedModelOutput {
    pub match_percentage: Option<f64>,
    pub missing_keywords: Option<Vec<String>>,
    pub profile_summary: Option<String>,
    pub suggestions: Option<String>,
    pub stage: ParseStage,
}

impl ParsedModelOutput {
    pub fn exhausted() -> Self {
        Self {
            match_percentage: None,
            missing_keywords: None,
            profile_summary: None,
            suggestions: None,
            stage: ParseStage::Exhausted,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.stage == ParseStage::Exhausted
    }
}

/// Result of one decode stage.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded(Map<String, Value>),
    NotDecoded,
}

impl DecodeOutcome {
    fn or_else(self, next: impl FnOnce() -> DecodeOutcome) -> DecodeOutcome {
        match self {
            DecodeOutcome::Decoded(_) => self,
            DecodeOutcome::NotDecoded => next(),
        }
    }
}

fn object_regex() -> &'static Regex {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*?\}").expect("Invalid object regex"))
}

/// Decode `text` as a single JSON object. Valid JSON of any other shape does
/// not count.
fn decode_object(text: &str) -> DecodeOutcome {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => DecodeOutcome::Decoded(map),
        Ok(other) => {
            debug!("Decoded JSON is not an object: {}", json_kind(&other));
            DecodeOutcome::NotDecoded
        }
        Err(_) => DecodeOutcome::NotDecoded,
    }
}

pub fn strict_decode(raw: &str) -> DecodeOutcome {
    decode_object(raw)
}

/// Decode the first brace-delimited span of `raw`. The match is non-greedy, so
/// only the shortest candidate starting at the first `{` is tried.
pub fn extraction_decode(raw: &str) -> DecodeOutcome {
    match object_regex().find(raw) {
        Some(candidate) => decode_object(candidate.as_str()),
        None => DecodeOutcome::NotDecoded,
    }
}

/// Parse a raw model response into its structured fields.
pub fn parse(raw: &str) -> ParsedModelOutput {
    let mut stage = ParseStage::Strict;
    let outcome = strict_decode(raw).or_else(|| {
        stage = ParseStage::Extracted;
        extraction_decode(raw)
    });

    match outcome {
        DecodeOutcome::Decoded(fields) => {
            debug!("Model response decoded at stage {:?}", stage);
            extract_fields(&fields, stage)
        }
        DecodeOutcome::NotDecoded => {
            debug!("Model response not decodable ({} chars)", raw.len());
            ParsedModelOutput::exhausted()
        }
    }
}

fn extract_fields(fields: &Map<String, Value>, stage: ParseStage) -> ParsedModelOutput {
    ParsedModelOutput {
        match_percentage: fields.get(FIELD_MATCH).and_then(parse_match_percentage),
        missing_keywords: Some(
            fields
                .get(FIELD_MISSING_KEYWORDS)
                .map(string_list)
                .unwrap_or_default(),
        ),
        profile_summary: fields
            .get(FIELD_PROFILE_SUMMARY)
            .and_then(Value::as_str)
            .map(str::to_string),
        suggestions: fields
            .get(FIELD_SUGGESTIONS)
            .and_then(Value::as_str)
            .map(str::to_string),
        stage,
    }
}

/// `"82%"`, `" 82.5 % "` and `82` all give a score; an empty or non-numeric
/// string gives none. Scores are clamped to 0..=100.
fn parse_match_percentage(value: &Value) -> Option<f64> {
    let number = match value {
        Value::String(s) => {
            let cleaned = s.replace('%', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    number.is_finite().then(|| number.clamp(0.0, 100.0))
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
