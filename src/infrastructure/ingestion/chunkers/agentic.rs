//! LLM-assisted chunking strategy

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ingestion::{helpers, ChunkingStrategy};
use crate::domain::knowledge_base::Document;
use crate::domain::{DomainError, LanguageModel};

/// Default upper bound for a single chunk, in characters
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 5000;

/// Chunking strategy that asks a language model where to break the text
///
/// Best effort: an unusable reply falls back to a hard cut at `max_chunk_size`.
#[derive(Clone)]
pub struct AgenticChunker {
    model: Arc<dyn LanguageModel>,
    max_chunk_size: usize,
}

impl std::fmt::Debug for AgenticChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgenticChunker")
            .field("model", &self.model.provider_name())
            .field("max_chunk_size", &self.max_chunk_size)
            .finish()
    }
}

impl AgenticChunker {
    /// Create a new agentic chunker with the default maximum chunk size
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }

    /// Set the maximum chunk size
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Result<Self, DomainError> {
        if max_chunk_size == 0 {
            return Err(DomainError::validation(
                "max_chunk_size must be greater than 0",
            ));
        }

        self.max_chunk_size = max_chunk_size;
        Ok(self)
    }

    fn build_prompt(window: &str, max_chunk_size: usize) -> String {
        format!(
            "Analyze this text and determine a natural breakpoint within the first {} characters. \
             Consider semantic completeness, paragraph boundaries, and topic transitions. \
             Return only the character position number of where to break the text:\n\n{}",
            max_chunk_size, window
        )
    }

    /// Interpret a model reply as a break position in `1..=max`
    fn parse_break_point(reply: &str, max: usize) -> Option<usize> {
        let position: i64 = reply.trim().parse().ok()?;
        let clamped = position.clamp(0, max as i64) as usize;

        (clamped > 0).then_some(clamped)
    }

    async fn break_point(&self, window: &str) -> usize {
        let prompt = Self::build_prompt(window, self.max_chunk_size);

        match self.model.complete(&prompt).await {
            Ok(reply) => Self::parse_break_point(&reply, self.max_chunk_size).unwrap_or_else(|| {
                debug!(reply = %reply, "Unusable break point, cutting at max size");
                self.max_chunk_size
            }),
            Err(e) => {
                warn!(error = %e, "Break point request failed, cutting at max size");
                self.max_chunk_size
            }
        }
    }

    async fn split(&self, content: &str) -> Vec<String> {
        let mut remaining: Vec<char> = content.chars().collect();
        let mut pieces = Vec::new();

        while remaining.len() > self.max_chunk_size {
            let window = helpers::char_slice(&remaining, 0, self.max_chunk_size);
            let cut = self.break_point(&window).await;

            let piece = helpers::char_slice(&remaining, 0, cut);
            let piece = piece.trim();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }

            remaining.drain(..cut);
        }

        let tail: String = remaining.into_iter().collect();
        let tail = tail.trim();
        if !tail.is_empty() {
            pieces.push(tail.to_string());
        }

        pieces
    }
}

#[async_trait]
impl ChunkingStrategy for AgenticChunker {
    async fn chunk(&self, document: &Document) -> Result<Vec<Document>, DomainError> {
        if let Some(chunks) = helpers::trivial_chunks(document) {
            return Ok(chunks);
        }

        let pieces = self.split(&document.content).await;

        Ok(helpers::into_chunks(document, pieces))
    }

    fn name(&self) -> &'static str {
        "agentic"
    }
}
