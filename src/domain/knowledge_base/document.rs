//! Document: the unit of content moving through the pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::embedding::Embedder;
use crate::domain::DomainError;

/// Metadata key holding a chunk's 1-based position
pub const META_CHUNK: &str = "chunk";
/// Metadata key holding a chunk's length in characters
pub const META_CHUNK_SIZE: &str = "chunk_size";
/// Metadata key holding the URL a document was crawled from
pub const META_URL: &str = "url";

/// A piece of content with identity, provenance and an optional embedding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content
    pub content: String,
    /// Stable identity; when absent the content fingerprint is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable label, usually shared by all chunks of one source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form provenance
    #[serde(default)]
    pub meta_data: HashMap<String, serde_json::Value>,
    /// Vector attached by the embedding step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a new document from content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta_data.insert(key.into(), value);
        self
    }

    /// Replace all metadata
    pub fn with_meta_data(mut self, meta_data: HashMap<String, serde_json::Value>) -> Self {
        self.meta_data = meta_data;
        self
    }

    /// Attach an embedding
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Parse a document from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("Invalid document JSON: {}", e)))
    }

    /// Build a document from an already-parsed JSON object
    pub fn from_value(value: serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(value)
            .map_err(|e| DomainError::validation(format!("Invalid document object: {}", e)))
    }

    /// Serialize the document to JSON
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize document: {}", e)))
    }

    /// Whether a chunking strategy already produced this document
    pub fn is_chunked(&self) -> bool {
        self.meta_data.contains_key(META_CHUNK)
    }

    /// 1-based chunk position, if chunked
    pub fn chunk_position(&self) -> Option<u64> {
        self.meta_data.get(META_CHUNK).and_then(|v| v.as_u64())
    }

    /// Content length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Embed the content unless an embedding is already attached.
    ///
    /// Returns `false` when the embedder produced no vector; the document is
    /// left without an embedding in that case.
    pub async fn embed(&mut self, embedder: &dyn Embedder) -> bool {
        if self.embedding.as_ref().is_some_and(|e| !e.is_empty()) {
            return true;
        }

        let vector = embedder.get_embedding(&self.content).await;

        if vector.is_empty() {
            return false;
        }

        self.embedding = Some(vector);
        true
    }
}
