//! Document-structure-aware chunking strategy

use async_trait::async_trait;

use crate::domain::ingestion::{helpers, ChunkingConfig, ChunkingStrategy};
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Chunking strategy that packs whole paragraphs into chunks
///
/// A paragraph larger than `chunk_size` becomes its own chunk and is never split.
#[derive(Debug, Clone, Default)]
pub struct DocumentChunker {
    config: ChunkingConfig,
}

impl DocumentChunker {
    /// Create a new document chunker
    pub fn new(config: ChunkingConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Paragraphs separated by one or more blank lines
    fn split_paragraphs(text: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }

        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }

        paragraphs
    }

    fn pack(&self, paragraphs: Vec<String>) -> Vec<String> {
        let separator_len = PARAGRAPH_SEPARATOR.len();
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for paragraph in paragraphs {
            let paragraph_len = paragraph.chars().count();

            if current.is_empty() {
                current = paragraph;
                current_len = paragraph_len;
            } else if current_len + separator_len + paragraph_len <= self.config.chunk_size {
                current.push_str(PARAGRAPH_SEPARATOR);
                current.push_str(&paragraph);
                current_len += separator_len + paragraph_len;
            } else {
                chunks.push(std::mem::replace(&mut current, paragraph));
                current_len = paragraph_len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    fn apply_overlap(&self, chunks: Vec<String>) -> Vec<String> {
        if self.config.overlap == 0 {
            return chunks;
        }

        let mut result = Vec::with_capacity(chunks.len());
        let mut previous: Option<Vec<char>> = None;

        for chunk in chunks {
            let chars: Vec<char> = chunk.chars().collect();

            let overlapped = match previous {
                Some(ref prev) if prev.len() >= self.config.overlap
                    && chars.len() + self.config.overlap <= self.config.chunk_size =>
                {
                    let tail = helpers::char_slice(prev, prev.len() - self.config.overlap, prev.len());
                    format!("{}{}", tail, chunk)
                }
                _ => chunk,
            };

            previous = Some(chars);
            result.push(overlapped);
        }

        result
    }
}

#[async_trait]
impl ChunkingStrategy for DocumentChunker {
    async fn chunk(&self, document: &Document) -> Result<Vec<Document>, DomainError> {
        if let Some(chunks) = helpers::trivial_chunks(document) {
            return Ok(chunks);
        }

        let paragraphs = Self::split_paragraphs(&document.content);
        let chunks = self.apply_overlap(self.pack(paragraphs));

        Ok(helpers::into_chunks(document, chunks))
    }

    fn name(&self) -> &'static str {
        "document"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> DocumentChunker {
        DocumentChunker::new(ChunkingConfig::new(size, overlap)).unwrap()
    }

    async fn contents(chunker: &DocumentChunker, text: &str) -> Vec<String> {
        chunker
            .chunk(&Document::new(text))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect()
    }

    #[tokio::test]
    async fn test_single_paragraph() {
        let chunks = contents(&chunker(1000, 0), "This is a single paragraph.").await;
        assert_eq!(chunks, vec!["This is a single paragraph."]);
    }

    #[tokio::test]
    async fn test_paragraphs_packed_to_chunk_size() {
        let content = "Short para.\n\nAnother short.\n\nOne more.";
        let chunks = contents(&chunker(30, 0), content).await;

        assert_eq!(chunks, vec!["Short para.\n\nAnother short.", "One more."]);
    }

    #[tokio::test]
    async fn test_oversized_paragraph_is_not_split() {
        let long = "x".repeat(50);
        let content = format!("intro\n\n{}\n\noutro", long);
        let chunks = contents(&chunker(20, 0), &content).await;

        assert_eq!(chunks, vec!["intro".to_string(), long, "outro".to_string()]);
    }

    #[tokio::test]
    async fn test_multiple_blank_lines() {
        let content = "Para one.\n\n\n  \nPara two.\n\n\n\n\nPara three.";
        let chunks = contents(&chunker(10, 0), content).await;

        assert_eq!(chunks, vec!["Para one.", "Para two.", "Para three."]);
    }

    #[tokio::test]
    async fn test_overlap_prepended_only_when_it_fits() {
        let content = "aaaa\n\nbbbb\n\ncccccccccc";
        let chunks = contents(&chunker(10, 2), content).await;

        assert_eq!(chunks[0], "aaaa\n\nbbbb");
        // The third paragraph already fills the window
        assert_eq!(chunks[1], "cccccccccc");

        let chunks = contents(&chunker(10, 2), "aaaa\n\nbbbbbbbb\n\ncc").await;
        assert_eq!(chunks, vec!["aaaa", "aabbbbbbbb", "bbcc"]);
    }

    #[tokio::test]
    async fn test_metadata_positions() {
        let chunks = chunker(12, 0)
            .chunk(&Document::new("First one.\n\nSecond one.\n\nThird one.").with_id("d"))
            .await
            .unwrap();

        let positions: Vec<u64> = chunks.iter().filter_map(|c| c.chunk_position()).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(chunks[2].id.as_deref(), Some("d_3"));
    }

    #[test]
    fn test_name() {
        assert_eq!(DocumentChunker::default().name(), "document");
    }
}
