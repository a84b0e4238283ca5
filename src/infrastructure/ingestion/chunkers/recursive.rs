//! Recursive-boundary chunking strategy

use async_trait::async_trait;

use crate::domain::ingestion::{helpers, ChunkingConfig, ChunkingStrategy};
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Boundaries tried in order when looking for a cut inside a window
const BOUNDARIES: [char; 2] = ['\n', '.'];

/// Chunking strategy that cuts each window after its last newline or period
///
/// Falls back to a raw size cut when the window contains neither.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker {
    config: ChunkingConfig,
}

impl RecursiveChunker {
    /// Create a new recursive chunker
    pub fn new(config: ChunkingConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Exclusive end of the chunk starting at `start`
    fn find_cut(chars: &[char], start: usize, window_end: usize) -> usize {
        if window_end >= chars.len() {
            return chars.len();
        }

        BOUNDARIES
            .iter()
            .find_map(|boundary| {
                chars[start..window_end]
                    .iter()
                    .rposition(|c| c == boundary)
                    .map(|offset| start + offset + 1)
            })
            .unwrap_or(window_end)
    }

    fn split(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let window_end = (start + self.config.chunk_size).min(chars.len());
            let end = Self::find_cut(&chars, start, window_end);

            let piece = helpers::char_slice(&chars, start, end);

            if !piece.is_empty() {
                pieces.push(piece);
            }

            if end >= chars.len() {
                break;
            }

            let next = end.saturating_sub(self.config.overlap);
            start = if next > start { next } else { end };
        }

        pieces
    }
}

#[async_trait]
impl ChunkingStrategy for RecursiveChunker {
    async fn chunk(&self, document: &Document) -> Result<Vec<Document>, DomainError> {
        if let Some(chunks) = helpers::trivial_chunks(document) {
            return Ok(chunks);
        }

        Ok(helpers::into_chunks(document, self.split(&document.content)))
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> RecursiveChunker {
        RecursiveChunker::new(ChunkingConfig::new(size, overlap)).unwrap()
    }

    async fn contents(chunker: &RecursiveChunker, text: &str) -> Vec<String> {
        chunker
            .chunk(&Document::new(text))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect()
    }

    #[tokio::test]
    async fn test_cuts_after_newline() {
        let text = "first line\nsecond line that is long";
        let chunks = contents(&chunker(20, 0), text).await;

        assert_eq!(chunks[0], "first line\n");
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
    }

    #[tokio::test]
    async fn test_prefers_newline_over_period() {
        let text = "One. Two\nThree. Four five six";
        let chunks = contents(&chunker(16, 0), text).await;

        assert_eq!(chunks[0], "One. Two\n");
    }

    #[tokio::test]
    async fn test_cuts_after_period() {
        let text = "Short one. Then a much longer sentence follows";
        let chunks = contents(&chunker(20, 0), text).await;

        assert_eq!(chunks[0], "Short one.");
    }

    #[tokio::test]
    async fn test_chunks_rebuild_content_without_overlap() {
        let text = "ab.\n\ncd ef\n  gh";
        let chunks = contents(&chunker(5, 0), text).await;

        assert_eq!(chunks, vec!["ab.\n\n", "cd ef", "\n  gh"]);
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test]
    async fn test_indented_lines_keep_whitespace() {
        let text = "fn main() {\n    body();\n}\n";
        let chunks = contents(&chunker(16, 0), text).await;

        assert!(chunks.iter().all(|c| c.chars().count() <= 16));
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test]
    async fn test_raw_cut_without_boundaries() {
        let chunks = contents(&chunker(4, 0), "abcdefghij").await;
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[tokio::test]
    async fn test_overlap_always_moves_forward() {
        let text = "a.b.c.d.e.f.g.h.i.j.";
        let chunks = chunker(4, 3)
            .chunk(&Document::new(text))
            .await
            .unwrap();

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.char_len() <= 4));
    }

    #[tokio::test]
    async fn test_small_content_single_chunk() {
        let chunks = contents(&chunker(100, 0), "Just one sentence.").await;
        assert_eq!(chunks, vec!["Just one sentence."]);
    }

    #[tokio::test]
    async fn test_empty_content() {
        assert!(contents(&chunker(10, 0), "").await.is_empty());
        assert_eq!(RecursiveChunker::default().name(), "recursive");
    }
}
