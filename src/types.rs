//! Core type definitions for the context bridge pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user was looking at when the pipeline fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMetadata {
    pub selected_text: String,
    pub file_name: String,
    pub file_language: String,
    pub line_number: u32,      // 1-based
    pub timestamp: i64,        // epoch ms
}

/// System a record was harvested from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSource {
    Teams,
    SharePoint,
    #[serde(rename = "GitHub PR", alias = "GitHub-PR")]
    GitHubPr,
    #[serde(rename = "GitHub Issue", alias = "GitHub-Issue")]
    GitHubIssue,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordSource::Teams => "Teams",
            RecordSource::SharePoint => "SharePoint",
            RecordSource::GitHubPr => "GitHub PR",
            RecordSource::GitHubIssue => "GitHub Issue",
        };
        f.write_str(label)
    }
}

/// Catalog entry: one unit of prior team knowledge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    pub id: String,
    pub source: RecordSource,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub timestamp: String,         // ISO-8601, parsed lazily at scoring time
    pub author: String,
    #[serde(default)]
    pub relevance_score: f64,      // carried through, never read
    pub url: String,
}

/// Record with its transient ranking score. Never serialized.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: ContextRecord,
    pub keyword_matches: usize,
    pub calculated_score: f64,
}

/// Pipeline result handed to the display surface and kept in the session cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMap {
    pub metadata: IntentMetadata,
    pub nuggets: Vec<ContextRecord>,
    pub cached_at: i64,
    pub session_id: String,
}

/// Pipeline states. `Validation` and `Persistence` are declared for
/// forward compatibility and have no place in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum State {
    #[default]
    #[serde(rename = "State_Idle")]
    Idle,
    #[serde(rename = "State_Trigger")]
    Trigger,
    #[serde(rename = "State_Retrieval")]
    Retrieval,
    #[serde(rename = "State_Display")]
    Display,
    #[serde(rename = "State_Validation")]
    Validation,
    #[serde(rename = "State_Persistence")]
    Persistence,
}

impl State {
    /// Next state in the Idle → Trigger → Retrieval → Display → Idle cycle,
    /// with the label recorded for that transition.
    pub fn successor(self) -> Option<(State, &'static str)> {
        match self {
            State::Idle => Some((State::Trigger, "text-selected")),
            State::Trigger => Some((State::Retrieval, "metadata-extracted")),
            State::Retrieval => Some((State::Display, "context-retrieved")),
            State::Display => Some((State::Idle, "context-displayed")),
            State::Validation | State::Persistence => None,
        }
    }
}

/// Audit entry appended on every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: State,
    pub to: State,
    pub trigger: String,
    pub data: TransitionData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionData {
    pub timestamp: i64, // epoch ms
}

/// Weights and thresholds for relevance scoring
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub keyword_match: f64,
    pub recency: f64,
    pub recent: f64,            // recency score inside the window
    pub stale: f64,             // recency score outside it, or unparseable
    pub recency_window_days: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            keyword_match: 0.7,
            recency: 0.3,
            recent: 1.0,
            stale: 0.5,
            recency_window_days: 180,
        }
    }
}
