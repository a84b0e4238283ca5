//! Language model trait used by LLM-assisted chunking

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A text-completion model
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single prompt and return the model's text reply
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
