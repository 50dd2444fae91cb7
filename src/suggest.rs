//! Suggestion sources for bulk risk identification
//!
//! A [`SuggestionSource`] proposes risk or cause descriptions for a given
//! topic; the register imports accepted suggestions in bulk with
//! incrementing sequence numbers. The shipped implementation reads a CSV
//! catalog (description, category, source columns), which covers the common
//! workflow of importing from an organization-wide risk library.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::entities::{RiskCategory, RiskSource};

/// One proposed risk or cause
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub description: String,
    pub category: Option<RiskCategory>,
    pub source: Option<RiskSource>,
}

impl Suggestion {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: None,
            source: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("failed to read suggestion catalog '{path}': {message}")]
    Catalog { path: PathBuf, message: String },
}

/// Anything that can propose suggestions for a topic
pub trait SuggestionSource {
    /// Up to `count` suggestions relevant to `topic`
    fn suggest(&self, topic: &str, count: usize) -> Result<Vec<Suggestion>, SuggestError>;
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// CSV-backed suggestion catalog. Expected header:
/// `description,category,source` (category and source may be blank).
pub struct CsvSuggestionSource {
    path: PathBuf,
}

impl CsvSuggestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<CatalogRow>, SuggestError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| SuggestError::Catalog {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: CatalogRow = record.map_err(|e| SuggestError::Catalog {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl SuggestionSource for CsvSuggestionSource {
    fn suggest(&self, topic: &str, count: usize) -> Result<Vec<Suggestion>, SuggestError> {
        let needle = topic.to_lowercase();
        let suggestions = self
            .read_rows()?
            .into_iter()
            .filter(|row| !row.description.trim().is_empty())
            .filter(|row| needle.is_empty() || row.description.to_lowercase().contains(&needle))
            .take(count)
            .map(|row| Suggestion {
                description: row.description,
                category: row
                    .category
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .and_then(|s| RiskCategory::from_str(s).ok()),
                source: row
                    .source
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .and_then(|s| RiskSource::from_str(s).ok()),
            })
            .collect();
        Ok(suggestions)
    }
}
