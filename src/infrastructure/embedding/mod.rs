//! Embedder implementations

mod openai;

pub use openai::OpenAiEmbedder;

// Re-export HTTP client for use by embedders
pub use super::llm::{HttpClient, HttpClientTrait};
