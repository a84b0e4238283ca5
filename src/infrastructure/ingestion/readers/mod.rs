//! Reader implementations

mod csv;
mod html;
mod json;
mod markdown;
mod text;
mod website;

pub use self::csv::CsvReader;
pub use html::HtmlReader;
pub use json::JsonReader;
pub use markdown::MarkdownReader;
pub use text::TextReader;
pub use website::{CrawlSession, CrawlerConfig, WebsiteReader};

use crate::domain::DomainError;

/// Read a UTF-8 file, mapping I/O failures to source read errors
pub(crate) async fn read_source_file(path: &str) -> Result<String, DomainError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::source_read(path, e.to_string()))
}
