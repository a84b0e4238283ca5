//! Embedder trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Maps text to a vector for similarity search (OpenAI, local models, etc.)
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Vector dimensions produced by this embedder, when known
    fn dimensions(&self) -> Option<usize>;

    /// Embed a text, returning an empty vector on failure.
    ///
    /// Callers interpret the empty vector as "no embedding available".
    async fn get_embedding(&self, text: &str) -> Vec<f32> {
        match self.embed(text).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider_name(),
                    error = %e,
                    "Embedding failed"
                );
                Vec::new()
            }
        }
    }
}
