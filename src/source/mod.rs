//! Record sources
//!
//! The sort core treats records as opaque input. A [`RecordSource`] is the
//! boundary where they come from: it answers a [`Selection`] with a list of
//! records or a [`FetchError`]. When the selection carries a limit, the source
//! keeps the top records by key but hands them back in their stored order, so
//! there is still something left to sort.

use crate::analysis::retain_top;
use crate::errors::FetchError;
use crate::record::{Record, SortOrder};
use crate::trace::Algorithm;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a caller wants from a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: String,
    pub algorithm: Algorithm,
    pub order: SortOrder,
    /// Keep only this many top records
    pub limit: Option<usize>,
}

impl Selection {
    pub fn new(key: &str) -> Self {
        Selection {
            key: key.to_string(),
            algorithm: Algorithm::default(),
            order: SortOrder::default(),
            limit: None,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key '{}' ({}, {}", self.key, self.algorithm, self.order)?;
        if let Some(limit) = self.limit {
            write!(f, ", top {}", limit)?;
        }
        write!(f, ")")
    }
}

/// Anything that can supply records for a selection
pub trait RecordSource {
    fn fetch(&self, selection: &Selection) -> Result<Vec<Record>, FetchError>;
}

/// Apply a selection to records already in hand
pub fn select(records: Vec<Record>, selection: &Selection) -> Result<Vec<Record>, FetchError> {
    if !records.is_empty() && !records.iter().any(|r| r.contains(&selection.key)) {
        return Err(FetchError::NotFound {
            selection: selection.to_string(),
        });
    }

    match selection.limit {
        None => Ok(records),
        Some(n) => retain_top(
            &records,
            &selection.key,
            selection.algorithm,
            selection.order,
            n,
        )
        .map_err(|source| FetchError::InvalidSelection {
            selection: selection.to_string(),
            source,
        }),
    }
}

/// Records held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        StaticSource { records }
    }
}

impl RecordSource for StaticSource {
    fn fetch(&self, selection: &Selection) -> Result<Vec<Record>, FetchError> {
        select(self.records.clone(), selection)
    }
}

/// Records stored as a JSON array of objects
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Record>, FetchError> {
        let display = self.path.display().to_string();
        let text = fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| FetchError::Parse {
            path: display,
            message: e.to_string(),
        })
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&self, selection: &Selection) -> Result<Vec<Record>, FetchError> {
        let records = self.read_all()?;
        debug!(path = %self.path.display(), records = records.len(), "loaded records");
        select(records, selection)
    }
}
