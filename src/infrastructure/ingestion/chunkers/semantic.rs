//! Semantic chunking strategy

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::embedding::{cosine_similarity, Embedder};
use crate::domain::ingestion::{helpers, ChunkingStrategy};
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Default similarity below which adjacent sentences start a new chunk
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;

/// Chunking strategy that cuts where adjacent sentences stop being similar
///
/// Best effort: any embedding failure yields one chunk holding the whole document.
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    similarity_threshold: f32,
}

impl SemanticChunker {
    /// Create a new semantic chunker
    pub fn new(embedder: Arc<dyn Embedder>, chunk_size: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        Ok(Self {
            embedder,
            chunk_size,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        })
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DomainError::validation(format!(
                "similarity_threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }

        self.similarity_threshold = threshold;
        Ok(self)
    }

    fn split_sentences(text: &str) -> Vec<&str> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// One embedding per sentence, or `None` if any of them failed
    async fn embed_all(&self, sentences: &[&str]) -> Option<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(sentences.len());

        for sentence in sentences {
            match self.embedder.embed(sentence).await {
                Ok(vector) if !vector.is_empty() => embeddings.push(vector),
                Ok(_) => {
                    warn!("Embedder returned an empty vector, keeping document whole");
                    return None;
                }
                Err(e) => {
                    warn!(error = %e, "Sentence embedding failed, keeping document whole");
                    return None;
                }
            }
        }

        Some(embeddings)
    }

    fn group(&self, sentences: &[&str], embeddings: &[Vec<f32>]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for (i, sentence) in sentences.iter().enumerate() {
            let sentence_len = sentence.chars().count();

            if current.is_empty() {
                current.push_str(sentence);
                current_len = sentence_len;
                continue;
            }

            let similarity = cosine_similarity(&embeddings[i - 1], &embeddings[i]);
            let too_large = current_len + 1 + sentence_len > self.chunk_size;

            if similarity < self.similarity_threshold || too_large {
                chunks.push(std::mem::take(&mut current));
                current.push_str(sentence);
                current_len = sentence_len;
            } else {
                current.push(' ');
                current.push_str(sentence);
                current_len += 1 + sentence_len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

#[async_trait]
impl ChunkingStrategy for SemanticChunker {
    async fn chunk(&self, document: &Document) -> Result<Vec<Document>, DomainError> {
        if let Some(chunks) = helpers::trivial_chunks(document) {
            return Ok(chunks);
        }

        let sentences = Self::split_sentences(&document.content);

        if sentences.len() <= 1 {
            return Ok(helpers::into_chunks(document, [document.content.clone()]));
        }

        let Some(embeddings) = self.embed_all(&sentences).await else {
            return Ok(helpers::into_chunks(document, [document.content.clone()]));
        };

        Ok(helpers::into_chunks(document, self.group(&sentences, &embeddings)))
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}
