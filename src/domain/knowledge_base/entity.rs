//! Load options, load reports and source descriptors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::Filters;
use crate::domain::ingestion::ReaderFormat;

/// A location to read from plus the format used to resolve its reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// File path or seed URL
    pub location: String,
    /// Format tag resolved to a reader at configuration time
    pub format: ReaderFormat,
}

impl Source {
    /// Create a new source
    pub fn new(location: impl Into<String>, format: ReaderFormat) -> Self {
        Self {
            location: location.into(),
            format,
        }
    }

    /// Create a source whose format is detected from the location's extension
    pub fn from_path(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        let format = ReaderFormat::from_path(&location)?;
        Some(Self { location, format })
    }
}

/// Options controlling how a load writes to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Drop and recreate the collection before loading
    #[serde(default)]
    pub recreate: bool,
    /// Insert-or-replace when the backend supports it
    #[serde(default)]
    pub upsert: bool,
    /// Filter out documents already stored before inserting
    #[serde(default = "default_true")]
    pub skip_existing: bool,
    /// Opaque filters forwarded to the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

fn default_true() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            recreate: false,
            upsert: false,
            skip_existing: true,
            filters: None,
        }
    }
}

impl LoadOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recreate
    pub fn with_recreate(mut self, recreate: bool) -> Self {
        self.recreate = recreate;
        self
    }

    /// Set upsert
    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Set skip_existing
    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    /// Set filters
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Summary of a completed load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Documents produced by readers and chunking
    pub documents_read: usize,
    /// Documents that reached storage
    pub documents_written: usize,
    /// Documents dropped because they already existed
    pub documents_skipped: usize,
    /// Documents the backend rejected or a failed batch contained
    pub documents_failed: usize,
    /// Sources whose reader failed
    pub sources_failed: usize,
    /// Sources skipped because they were already indexed
    pub sources_skipped: usize,
    /// Load start time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Load completion time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LoadReport {
    /// Create a report stamped with the current time
    pub fn started() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Stamp the completion time
    pub fn complete(mut self) -> Self {
        self.completed_at = Some(Utc::now());
        self
    }

    /// Fold another report's counters into this one
    pub fn merge(&mut self, other: &LoadReport) {
        self.documents_read += other.documents_read;
        self.documents_written += other.documents_written;
        self.documents_skipped += other.documents_skipped;
        self.documents_failed += other.documents_failed;
        self.sources_failed += other.sources_failed;
        self.sources_skipped += other.sources_skipped;
    }

    /// Elapsed time in milliseconds, when both timestamps are set
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
