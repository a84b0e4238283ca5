//! OpenAI embedder implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::Embedder;
use crate::domain::DomainError;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Known OpenAI embedding models and their dimensions
const EMBEDDING_MODELS: &[(&str, usize)] = &[
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("text-embedding-ada-002", 1536),
];

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint
#[derive(Debug)]
pub struct OpenAiEmbedder<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: Option<usize>,
}

impl<C: HttpClientTrait> OpenAiEmbedder<C> {
    /// Create a new OpenAI embedder
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new embedder with custom base URL
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: None,
        }
    }

    /// Set the embedding model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request reduced output dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, text: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "input": text,
            "encoding_format": "float",
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Vec<f32>, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::embedding("Embedding response contained no data"))
    }
}

#[async_trait]
impl<C: HttpClientTrait> Embedder for OpenAiEmbedder<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(text);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions.or_else(|| {
            EMBEDDING_MODELS
                .iter()
                .find(|(name, _)| *name == self.model)
                .map(|(_, dims)| *dims)
        })
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn mock_response(embedding: Vec<f32>) -> serde_json::Value {
        json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [{"object": "embedding", "index": 0, "embedding": embedding}],
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response(vec![0.1, 0.2]));
        let embedder = OpenAiEmbedder::new(client, "test-key");

        let vector = embedder.embed("hello").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2]);
    }

    #[tokio::test]
    async fn test_request_body_carries_model_and_dimensions() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response(vec![1.0]));
        let embedder = OpenAiEmbedder::new(client, "test-key")
            .with_model("text-embedding-3-large")
            .with_dimensions(256);

        embedder.embed("hello").await.unwrap();

        let requests = embedder.client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1["model"], "text-embedding-3-large");
        assert_eq!(requests[0].1["dimensions"], 256);
        assert_eq!(requests[0].1["input"], "hello");
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let embedder = OpenAiEmbedder::new(client, "test-key");

        assert!(embedder.embed("hello").await.is_err());
        assert!(embedder.get_embedding("hello").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_data_is_error() {
        let client = MockHttpClient::new().with_response(TEST_URL, json!({"data": []}));
        let embedder = OpenAiEmbedder::new(client, "test-key");

        let result = embedder.embed("hello").await;
        assert!(matches!(result, Err(DomainError::Embedding { .. })));
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/embeddings";
        let client = MockHttpClient::new().with_response(custom_url, mock_response(vec![0.5]));
        let embedder = OpenAiEmbedder::with_base_url(client, "key", "http://localhost:8080/");

        assert_eq!(embedder.embed("x").await.unwrap(), vec![0.5]);
    }

    #[test]
    fn test_provider_info() {
        let embedder = OpenAiEmbedder::new(MockHttpClient::new(), "key");
        assert_eq!(embedder.provider_name(), "openai");
        assert_eq!(embedder.dimensions(), Some(1536));
        assert_eq!(embedder.with_model("custom").dimensions(), None);
    }
}
