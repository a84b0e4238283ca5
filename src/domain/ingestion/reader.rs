//! Content reader trait and format tags

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Format tag mapped to a reader at configuration time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReaderFormat {
    /// Plain text files
    Text,
    /// Markdown files
    Markdown,
    /// HTML files
    Html,
    /// JSON files
    Json,
    /// CSV files
    Csv,
    /// PDF files (no reader provided)
    Pdf,
    /// Word documents (no reader provided)
    Docx,
    /// Crawled websites
    Website,
}

impl ReaderFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Text => &["txt", "text"],
            Self::Markdown => &["md", "markdown"],
            Self::Html => &["html", "htm"],
            Self::Json => &["json"],
            Self::Csv => &["csv"],
            Self::Pdf => &["pdf"],
            Self::Docx => &["docx"],
            Self::Website => &[],
        }
    }

    /// Detect the format of a location: http(s) URLs are websites, files go by extension
    pub fn from_path(location: &str) -> Option<Self> {
        let lower = location.to_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Some(Self::Website);
        }

        let file_name = lower.rsplit(['/', '\\']).next()?;
        let (_, ext) = file_name.rsplit_once('.')?;

        [
            Self::Text,
            Self::Markdown,
            Self::Html,
            Self::Json,
            Self::Csv,
            Self::Pdf,
            Self::Docx,
        ]
        .into_iter()
        .find(|format| format.extensions().contains(&ext))
    }
}

impl std::fmt::Display for ReaderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Website => write!(f, "website"),
        }
    }
}

/// Turns a source location into documents
#[async_trait]
pub trait Reader: Send + Sync + Debug {
    /// Read every document available at `source`
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError>;

    /// Get the reader name
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock reader serving canned documents per source
    #[derive(Debug, Default)]
    pub struct MockReader {
        documents: HashMap<String, Vec<Document>>,
        failing: Vec<String>,
        reads: Mutex<Vec<String>>,
    }

    impl MockReader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_documents(mut self, source: impl Into<String>, documents: Vec<Document>) -> Self {
            self.documents.insert(source.into(), documents);
            self
        }

        pub fn with_failure(mut self, source: impl Into<String>) -> Self {
            self.failing.push(source.into());
            self
        }

        pub fn reads(&self) -> Vec<String> {
            self.reads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Reader for MockReader {
        async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
            self.reads.lock().unwrap().push(source.to_string());

            if self.failing.iter().any(|s| s == source) {
                return Err(DomainError::source_read(source, "mock read failure"));
            }

            Ok(self.documents.get(source).cloned().unwrap_or_default())
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_extensions() {
        assert_eq!(ReaderFormat::from_path("notes.txt"), Some(ReaderFormat::Text));
        assert_eq!(ReaderFormat::from_path("README.MD"), Some(ReaderFormat::Markdown));
        assert_eq!(ReaderFormat::from_path("/a/b/page.htm"), Some(ReaderFormat::Html));
        assert_eq!(ReaderFormat::from_path("data.json"), Some(ReaderFormat::Json));
        assert_eq!(ReaderFormat::from_path("rows.csv"), Some(ReaderFormat::Csv));
        assert_eq!(ReaderFormat::from_path("paper.pdf"), Some(ReaderFormat::Pdf));
        assert_eq!(ReaderFormat::from_path("memo.docx"), Some(ReaderFormat::Docx));
    }

    #[test]
    fn test_from_path_urls_and_unknown() {
        assert_eq!(
            ReaderFormat::from_path("https://docs.example.com/guide.html"),
            Some(ReaderFormat::Website)
        );
        assert_eq!(ReaderFormat::from_path("archive.tar"), None);
        assert_eq!(ReaderFormat::from_path("Makefile"), None);
        assert_eq!(ReaderFormat::from_path("dir.d/Makefile"), None);
    }

    #[test]
    fn test_reader_format_serde() {
        let format: ReaderFormat = serde_json::from_str("\"website\"").unwrap();
        assert_eq!(format, ReaderFormat::Website);
        assert_eq!(ReaderFormat::Csv.to_string(), "csv");
    }
}
