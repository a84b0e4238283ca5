//! Chunking strategy trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::knowledge_base::{Document, META_CHUNK, META_CHUNK_SIZE};
use crate::domain::DomainError;

/// Configuration for size-bounded chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    #[serde(default)]
    pub overlap: usize,
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            overlap: 0,
        }
    }
}

/// Type of chunking strategy to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingType {
    /// Fixed-size character windows
    #[default]
    Fixed,
    /// Windows cut after the last newline or period
    Recursive,
    /// Paragraph packing
    Document,
    /// Cut where adjacent sentences stop being similar
    Semantic,
    /// Break points chosen by a language model
    Agentic,
}

impl std::fmt::Display for ChunkingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Recursive => write!(f, "recursive"),
            Self::Document => write!(f, "document"),
            Self::Semantic => write!(f, "semantic"),
            Self::Agentic => write!(f, "agentic"),
        }
    }
}

/// Splits one document into ordered, addressable chunks
#[async_trait]
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split a document into chunks.
    ///
    /// Already-chunked input comes back unchanged as a single element and
    /// empty content yields no chunks.
    async fn chunk(&self, document: &Document) -> Result<Vec<Document>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}

/// Helper functions shared by chunking strategies
pub mod helpers {
    use super::*;

    /// Result for inputs no strategy needs to split, if this is one
    pub fn trivial_chunks(document: &Document) -> Option<Vec<Document>> {
        if document.is_chunked() {
            return Some(vec![document.clone()]);
        }

        if document.content.is_empty() {
            return Some(Vec::new());
        }

        None
    }

    /// Build the `number`th (1-based) chunk of `parent`
    pub fn chunk_document(parent: &Document, content: impl Into<String>, number: usize) -> Document {
        let content = content.into();
        let size = content.chars().count();

        let mut meta_data = parent.meta_data.clone();
        meta_data.insert(META_CHUNK.to_string(), serde_json::Value::from(number));
        meta_data.insert(META_CHUNK_SIZE.to_string(), serde_json::Value::from(size));

        Document {
            content,
            id: parent.id.as_ref().map(|id| format!("{}_{}", id, number)),
            name: parent.name.clone(),
            meta_data,
            embedding: None,
        }
    }

    /// Number the pieces in order and turn them into chunks of `parent`
    pub fn into_chunks<I, S>(parent: &Document, pieces: I) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| chunk_document(parent, piece, i + 1))
            .collect()
    }

    /// Collect `chars[start..end]` into a string, clamping to bounds
    pub fn char_slice(chars: &[char], start: usize, end: usize) -> String {
        let end = end.min(chars.len());
        let start = start.min(end);
        chars[start..end].iter().collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunking_config_default() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 5000);
        assert_eq!(config.overlap, 0);
    }

    #[test]
    fn test_chunking_config_validation() {
        assert!(ChunkingConfig::new(100, 50).validate().is_ok());
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
        assert!(ChunkingConfig::new(100, 100).validate().is_err());
    }

    #[test]
    fn test_chunking_type_serde() {
        let parsed: ChunkingType = serde_json::from_str("\"semantic\"").unwrap();
        assert_eq!(parsed, ChunkingType::Semantic);
        assert_eq!(ChunkingType::default().to_string(), "fixed");
    }

    #[test]
    fn test_chunk_document_with_parent_id() {
        let parent = Document::new("abcdef")
            .with_id("doc")
            .with_name("source.txt")
            .with_meta("lang", json!("en"));

        let chunk = helpers::chunk_document(&parent, "abc", 2);

        assert_eq!(chunk.id.as_deref(), Some("doc_2"));
        assert_eq!(chunk.name.as_deref(), Some("source.txt"));
        assert_eq!(chunk.meta_data.get("lang"), Some(&json!("en")));
        assert_eq!(chunk.meta_data.get(META_CHUNK), Some(&json!(2)));
        assert_eq!(chunk.meta_data.get(META_CHUNK_SIZE), Some(&json!(3)));
        assert!(chunk.is_chunked());
    }

    #[test]
    fn test_chunk_document_without_parent_id() {
        let chunk = helpers::chunk_document(&Document::new("x"), "x", 1);
        assert!(chunk.id.is_none());
    }

    #[test]
    fn test_chunk_size_counts_characters() {
        let chunk = helpers::chunk_document(&Document::new("héllo"), "héllo", 1);
        assert_eq!(chunk.meta_data.get(META_CHUNK_SIZE), Some(&json!(5)));
    }

    #[test]
    fn test_trivial_chunks() {
        assert_eq!(helpers::trivial_chunks(&Document::new("")), Some(vec![]));
        assert!(helpers::trivial_chunks(&Document::new("text")).is_none());

        let chunked = helpers::chunk_document(&Document::new("text"), "text", 1);
        assert_eq!(
            helpers::trivial_chunks(&chunked),
            Some(vec![chunked.clone()])
        );
    }

    #[tokio::test]
    async fn test_mock_chunking_strategy() {
        let strategy = mock::MockChunkingStrategy::new();

        let chunks = strategy.chunk(&Document::new("hello world")).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(strategy.calls(), 1);
    }
}
