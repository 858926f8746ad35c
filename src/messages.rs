//! Messages exchanged with the display surface

use crate::types::{ContextMap, RecordSource};
use serde::{Deserialize, Serialize};

/// Outbound, one-way
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DisplayMessage {
    Loading,
    UpdateContext { payload: ContextMap },
    Clear,
}

/// Informational events sent back by the display surface. No reply expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    NavigateLink { payload: LinkNavigated },
    LogMetric { payload: MetricLogged },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkNavigated {
    pub nugget_id: String,
    pub source: RecordSource,
    pub url: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLogged {
    pub label: String,
    pub value: f64,
}

/// A selection as reported by the editor host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
    pub selected_text: String,
    pub file_name: String,
    pub file_language: String,
    pub line_number: u32,
}
