//! Pluggable catalog sources feeding the retrieval stage

use crate::error::CatalogError;
use crate::types::ContextRecord;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// "Get current catalog" capability injected into the state machine
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn load(&self) -> Result<Vec<ContextRecord>, CatalogError>;
}

/// Load a catalog, degrading to empty when the source fails
pub fn load_catalog_or_empty(source: &dyn CatalogSource) -> Vec<ContextRecord> {
    match source.load() {
        Ok(records) => {
            debug!("Catalog '{}' supplied {} records", source.name(), records.len());
            records
        }
        Err(e) => {
            warn!(
                "Catalog '{}' unavailable: {}. Continuing with an empty catalog.",
                source.name(),
                e
            );
            Vec::new()
        }
    }
}

/// Records held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<ContextRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<ContextRecord>) -> Self {
        Self { records }
    }
}

impl CatalogSource for StaticCatalog {
    fn name(&self) -> &'static str {
        "static"
    }

    fn load(&self) -> Result<Vec<ContextRecord>, CatalogError> {
        Ok(self.records.clone())
    }
}

/// Default source when nothing is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl CatalogSource for EmptyCatalog {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn load(&self) -> Result<Vec<ContextRecord>, CatalogError> {
        Ok(Vec::new())
    }
}

/// JSON document of the form `{"contexts": [...]}`, re-read on every load.
/// A missing file is an empty catalog; malformed entries are skipped.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CatalogSource for JsonFileCatalog {
    fn name(&self) -> &'static str {
        "json_file"
    }

    fn load(&self) -> Result<Vec<ContextRecord>, CatalogError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Catalog file {} not found, using empty catalog", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let doc: Value = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let entries = doc
            .get("contexts")
            .and_then(Value::as_array)
            .ok_or_else(|| CatalogError::MissingContexts {
                path: self.path.clone(),
            })?;

        Ok(decode_records(entries))
    }
}

/// Decode entries one by one so a single bad record does not sink the catalog
pub fn decode_records(entries: &[Value]) -> Vec<ContextRecord> {
    let mut records = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<ContextRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                let id = entry.get("id").and_then(Value::as_str).unwrap_or("<no id>");
                warn!("Skipping malformed catalog record #{} ({}): {}", idx, id, e);
            }
        }
    }

    records
}

/// Leading characters compared when looking for overlapping content
const SIMILAR_PREFIX_CHARS: usize = 30;

/// Pairs of record ids, each pair in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    pub duplicate_titles: Vec<(String, String)>,
    pub duplicate_urls: Vec<(String, String)>,
    pub similar_content: Vec<(String, String)>,
}

impl DuplicateReport {
    /// Similar content is advisory; only titles and URLs count as duplicates
    pub fn has_duplicates(&self) -> bool {
        !self.duplicate_titles.is_empty() || !self.duplicate_urls.is_empty()
    }
}

/// Compare every pair of records for a shared title (ignoring case), an
/// identical URL, or content where one record contains the other's opening
/// characters. Empty titles and URLs never match.
pub fn find_duplicates(records: &[ContextRecord]) -> DuplicateReport {
    let mut report = DuplicateReport::default();
    let titles: Vec<String> = records.iter().map(|r| r.title.to_lowercase()).collect();
    let contents: Vec<String> = records.iter().map(|r| r.content.to_lowercase()).collect();

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            let (a, b) = (&records[i], &records[j]);
            let pair = || (a.id.clone(), b.id.clone());

            if !titles[i].is_empty() && titles[i] == titles[j] {
                report.duplicate_titles.push(pair());
            }
            if !a.url.is_empty() && a.url == b.url {
                report.duplicate_urls.push(pair());
            }
            if contents_overlap(&contents[i], &contents[j]) {
                report.similar_content.push(pair());
            }
        }
    }

    report
}

fn contents_overlap(a: &str, b: &str) -> bool {
    let long_enough = |s: &str| s.chars().count() > SIMILAR_PREFIX_CHARS;
    if !long_enough(a) || !long_enough(b) {
        return false;
    }

    let prefix = |s: &str| s.chars().take(SIMILAR_PREFIX_CHARS).collect::<String>();
    a.contains(&prefix(b)) || b.contains(&prefix(a))
}
