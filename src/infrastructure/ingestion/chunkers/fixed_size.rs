//! Fixed-size chunking strategy

use async_trait::async_trait;

use crate::domain::ingestion::{helpers, ChunkingConfig, ChunkingStrategy};
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Chunking strategy that cuts content every `chunk_size` characters
#[derive(Debug, Clone, Default)]
pub struct FixedSizeChunker {
    config: ChunkingConfig,
}

impl FixedSizeChunker {
    /// Create a new fixed-size chunker
    pub fn new(config: ChunkingConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the chunking configuration
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    fn split(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.config.chunk_size).min(chars.len());
            pieces.push(helpers::char_slice(&chars, start, end));

            if end == chars.len() {
                break;
            }

            start = end - self.config.overlap;
        }

        pieces
    }
}

#[async_trait]
impl ChunkingStrategy for FixedSizeChunker {
    async fn chunk(&self, document: &Document) -> Result<Vec<Document>, DomainError> {
        if let Some(chunks) = helpers::trivial_chunks(document) {
            return Ok(chunks);
        }

        Ok(helpers::into_chunks(document, self.split(&document.content)))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
