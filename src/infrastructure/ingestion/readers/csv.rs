//! CSV reader

use async_trait::async_trait;

use super::read_source_file;
use crate::domain::ingestion::Reader;
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Reader for CSV files: all rows flattened into one document, one line per row
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvReader {
    /// Create a new CSV reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn flatten(&self, source: &str, raw: &str) -> Result<String, DomainError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(raw.as_bytes());

        let mut lines = Vec::new();

        for record in reader.records() {
            let record = record
                .map_err(|e| DomainError::source_read(source, format!("Invalid CSV: {}", e)))?;

            let line = record
                .iter()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(", ");

            if !line.trim_matches([',', ' ']).is_empty() {
                lines.push(line);
            }
        }

        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl Reader for CsvReader {
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
        let raw = read_source_file(source).await?;
        let content = self.flatten(source, &raw)?;

        if content.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![Document::new(content).with_name(source)])
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
