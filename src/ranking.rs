//! Top-N selection over scored records

use crate::scoring::score_catalog;
use crate::types::*;
use chrono::{DateTime, Utc};

/// Most nuggets a single run will surface
pub const MAX_NUGGETS: usize = 3;

/// Keep records that matched at least one keyword with a positive score,
/// order them by score (catalog order breaks ties), take `limit`, and drop
/// the transient score.
pub fn rank_records(mut scored: Vec<ScoredRecord>, limit: usize) -> Vec<ContextRecord> {
    scored.retain(|s| s.keyword_matches > 0 && s.calculated_score > 0.0);

    // sort_by is stable, so equal scores keep catalog order
    scored.sort_by(|a, b| b.calculated_score.total_cmp(&a.calculated_score));
    scored.truncate(limit);

    scored.into_iter().map(|s| s.record).collect()
}

/// Score the catalog against a selection and return the top nuggets
pub fn retrieve_context_nuggets(
    metadata: &IntentMetadata,
    catalog: &[ContextRecord],
    now: DateTime<Utc>,
    weights: &ScoreWeights,
) -> Vec<ContextRecord> {
    let scored = score_catalog(metadata, catalog, now, weights);
    rank_records(scored, MAX_NUGGETS)
}
