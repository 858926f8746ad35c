//! Intent metadata shaping and naive keyword extraction

use crate::types::IntentMetadata;

/// Tokens at or below this length are dropped
const MIN_KEYWORD_LEN: usize = 3;

/// Stamp a selection with the current time. Accepts any text, including empty.
/// Line numbers are 1-based; 0 is raised to 1.
pub fn extract_intent_metadata(
    selected_text: &str,
    file_name: &str,
    file_language: &str,
    line_number: u32,
    now_ms: i64,
) -> IntentMetadata {
    IntentMetadata {
        selected_text: selected_text.to_string(),
        file_name: file_name.to_string(),
        file_language: file_language.to_string(),
        line_number: line_number.max(1),
        timestamp: now_ms,
    }
}

/// Lower-case the text, split on runs of non-word characters and keep
/// tokens longer than three characters. Order follows the text; duplicates kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|token| token.len() > MIN_KEYWORD_LEN)
        .map(str::to_string)
        .collect()
}

// Word characters are ASCII letters, digits and underscore
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
