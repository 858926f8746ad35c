//! Relevance scoring for catalog records

use crate::extractor::extract_keywords;
use crate::types::*;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

/// Score every record against the selection. One entry per input record, same order.
pub fn score_catalog(
    metadata: &IntentMetadata,
    catalog: &[ContextRecord],
    now: DateTime<Utc>,
    weights: &ScoreWeights,
) -> Vec<ScoredRecord> {
    let query = extract_keywords(&metadata.selected_text);

    catalog
        .iter()
        .map(|record| score_record(record, &query, now, weights))
        .collect()
}

/// Weighted keyword-match plus recency score for a single record
pub fn score_record(
    record: &ContextRecord,
    query: &[String],
    now: DateTime<Utc>,
    weights: &ScoreWeights,
) -> ScoredRecord {
    let keyword_matches = count_keyword_matches(&record.keywords, query);
    let match_score = keyword_matches as f64 / record.keywords.len().max(1) as f64;
    let recency_score = recency_score(&record.timestamp, now, weights);

    ScoredRecord {
        record: record.clone(),
        keyword_matches,
        calculated_score: weights.keyword_match * match_score + weights.recency * recency_score,
    }
}

/// Count record keywords that contain, or are contained in, some query token
pub fn count_keyword_matches(keywords: &[String], query: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| {
            let kw = kw.to_lowercase();
            query
                .iter()
                .any(|q| kw.contains(q.as_str()) || q.contains(kw.as_str()))
        })
        .count()
}

/// Full credit inside the recency window, reduced credit outside it.
/// Timestamps that fail to parse count as stale.
pub fn recency_score(timestamp: &str, now: DateTime<Utc>, weights: &ScoreWeights) -> f64 {
    let cutoff = recency_cutoff(now, weights.recency_window_days);

    match parse_timestamp(timestamp) {
        // No representable cutoff: the window reaches past the earliest date
        Some(at) if cutoff.map_or(true, |cutoff| at > cutoff) => weights.recent,
        Some(_) => weights.stale,
        None => {
            debug!("Unparseable record timestamp '{}', scoring as stale", timestamp);
            weights.stale
        }
    }
}

/// Start of the recency window, or `None` when it falls outside chrono's range
pub fn recency_cutoff(now: DateTime<Utc>, window_days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(window_days).and_then(|window| now.checked_sub_signed(window))
}

/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a bare date
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}
