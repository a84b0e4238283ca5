//! JSON reader

use async_trait::async_trait;
use serde_json::Value;

use super::read_source_file;
use crate::domain::ingestion::Reader;
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Metadata key holding a document's 1-based position in a top-level array
pub const META_PAGE: &str = "page";

/// Reader for JSON files: one document per top-level array element, else one document
#[derive(Debug, Clone, Default)]
pub struct JsonReader;

impl JsonReader {
    /// Create a new JSON reader
    pub fn new() -> Self {
        Self
    }

    fn value_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn documents_from_value(source: &str, value: Value) -> Vec<Document> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Document::new(Self::value_text(item))
                        .with_name(source)
                        .with_meta(META_PAGE, Value::from(i + 1))
                })
                .filter(|doc| !doc.content.is_empty())
                .collect(),
            other => vec![Document::new(Self::value_text(&other)).with_name(source)],
        }
    }
}

#[async_trait]
impl Reader for JsonReader {
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
        let raw = read_source_file(source).await?;

        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| DomainError::source_read(source, format!("Invalid JSON: {}", e)))?;

        Ok(Self::documents_from_value(source, value))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
