//! Plain text reader

use async_trait::async_trait;

use super::read_source_file;
use crate::domain::ingestion::Reader;
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Reader for plain text files: one document per file
#[derive(Debug, Clone, Default)]
pub struct TextReader;

impl TextReader {
    /// Create a new text reader
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Reader for TextReader {
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
        let content = read_source_file(source).await?;

        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![Document::new(content).with_name(source)])
    }

    fn name(&self) -> &'static str {
        "text"
    }
}
