//! Environment-driven configuration for the server binary

use crate::types::ScoreWeights;
use std::path::PathBuf;

pub const DEFAULT_CATALOG_PATH: &str = "data/contextDatabase.json";
pub const DEFAULT_PORT: u16 = 8082;
/// Recency windows are clamped to a century
pub const MAX_RECENCY_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub catalog_path: PathBuf,
    pub port: u16,
    pub weights: ScoreWeights,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            port: DEFAULT_PORT,
            weights: ScoreWeights::default(),
        }
    }
}

impl BridgeConfig {
    /// Read `CONTEXT_BRIDGE_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let catalog_path = lookup("CONTEXT_BRIDGE_CATALOG")
            .map(PathBuf::from)
            .unwrap_or(defaults.catalog_path);

        let port = lookup("CONTEXT_BRIDGE_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let recency_window_days = lookup("CONTEXT_BRIDGE_RECENCY_DAYS")
            .and_then(|v| v.parse().ok())
            .filter(|days: &i64| *days > 0)
            .map(|days| days.min(MAX_RECENCY_WINDOW_DAYS))
            .unwrap_or(defaults.weights.recency_window_days);

        Self {
            catalog_path,
            port,
            weights: ScoreWeights {
                recency_window_days,
                ..defaults.weights
            },
        }
    }
}
