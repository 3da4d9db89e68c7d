//! Ranking of a scored batch

use crate::processing::record::ResumeRecord;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sort by match percentage, highest first, and assign ranks `1..=n`.
///
/// The sort is stable: records with equal percentages keep their submission
/// order, so the earlier upload gets the better rank.
pub fn aggregate(mut records: Vec<ResumeRecord>) -> Vec<ResumeRecord> {
    records.sort_by(|a, b| {
        b.match_percentage
            .partial_cmp(&a.match_percentage)
            .unwrap_or(Ordering::Equal)
    });

    for (index, record) in records.iter_mut().enumerate() {
        record.rank = Some(index + 1);
    }

    records
}

/// Records at or above `threshold`, in ranked order with their ranks unchanged.
pub fn filter_by_minimum(records: &[ResumeRecord], threshold: f64) -> Vec<&ResumeRecord> {
    records
        .iter()
        .filter(|record| record.match_percentage >= threshold)
        .collect()
}

/// How often each missing keyword was reported across the batch.
///
/// Keywords are compared case-insensitively and reported with the spelling
/// first seen. Most frequent first, then alphabetical.
pub fn missing_keyword_frequencies(records: &[ResumeRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();

    for keyword in records.iter().flat_map(|r| r.missing_keywords.iter()) {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            continue;
        }
        counts
            .entry(trimmed.to_lowercase())
            .or_insert_with(|| (trimmed.to_string(), 0))
            .1 += 1;
    }

    let mut frequencies: Vec<(String, usize)> = counts.into_values().collect();
    frequencies.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
    });
    frequencies
}
