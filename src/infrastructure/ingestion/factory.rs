//! Factories resolving configured chunkers and readers

use std::sync::Arc;

use crate::domain::embedding::Embedder;
use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy, ChunkingType, Reader, ReaderFormat};
use crate::domain::{DomainError, LanguageModel};
use crate::infrastructure::llm::HttpClient;

use super::chunkers::{
    AgenticChunker, DocumentChunker, FixedSizeChunker, RecursiveChunker, SemanticChunker,
    DEFAULT_MAX_CHUNK_SIZE, DEFAULT_SIMILARITY_THRESHOLD,
};
use super::readers::{CrawlerConfig, CsvReader, HtmlReader, JsonReader, MarkdownReader, TextReader, WebsiteReader};

const CRAWLER_USER_AGENT: &str = concat!("pmp-knowledge/", env!("CARGO_PKG_VERSION"));

/// Factory for creating chunking strategies
#[derive(Clone)]
pub struct ChunkerFactory {
    config: ChunkingConfig,
    similarity_threshold: f32,
    max_chunk_size: usize,
    embedder: Option<Arc<dyn Embedder>>,
    language_model: Option<Arc<dyn LanguageModel>>,
}

impl std::fmt::Debug for ChunkerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkerFactory")
            .field("config", &self.config)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("max_chunk_size", &self.max_chunk_size)
            .field("embedder", &self.embedder)
            .field("language_model", &self.language_model.as_ref().map(|m| m.provider_name()))
            .finish()
    }
}

impl Default for ChunkerFactory {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

impl ChunkerFactory {
    /// Create a factory with the given size configuration
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            config,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            embedder: None,
            language_model: None,
        }
    }

    /// Set the semantic similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the agentic maximum chunk size
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Embedder used by semantic chunking
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Language model used by agentic chunking
    pub fn with_language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Create a chunker for the given type
    pub fn create(&self, chunking_type: ChunkingType) -> Result<Arc<dyn ChunkingStrategy>, DomainError> {
        match chunking_type {
            ChunkingType::Fixed => Ok(Arc::new(FixedSizeChunker::new(self.config.clone())?)),
            ChunkingType::Recursive => Ok(Arc::new(RecursiveChunker::new(self.config.clone())?)),
            ChunkingType::Document => Ok(Arc::new(DocumentChunker::new(self.config.clone())?)),
            ChunkingType::Semantic => {
                let embedder = self.embedder.clone().ok_or_else(|| {
                    DomainError::configuration("Semantic chunking requires an embedder")
                })?;

                Ok(Arc::new(
                    SemanticChunker::new(embedder, self.config.chunk_size)?
                        .with_similarity_threshold(self.similarity_threshold)?,
                ))
            }
            ChunkingType::Agentic => {
                let model = self.language_model.clone().ok_or_else(|| {
                    DomainError::configuration("Agentic chunking requires a language model")
                })?;

                Ok(Arc::new(
                    AgenticChunker::new(model).with_max_chunk_size(self.max_chunk_size)?,
                ))
            }
        }
    }

    /// Get a list of all available chunking types
    pub fn available_types() -> Vec<ChunkingType> {
        vec![
            ChunkingType::Fixed,
            ChunkingType::Recursive,
            ChunkingType::Document,
            ChunkingType::Semantic,
            ChunkingType::Agentic,
        ]
    }
}

/// Factory mapping format tags to readers
#[derive(Debug, Clone, Default)]
pub struct ReaderFactory {
    crawler: CrawlerConfig,
    website_chunker: Option<Arc<dyn ChunkingStrategy>>,
}

impl ReaderFactory {
    /// Create a factory with default crawler settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the crawler configuration used for website sources
    pub fn with_crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.crawler = crawler;
        self
    }

    /// Chunk crawled pages inside the website reader
    pub fn with_website_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.website_chunker = Some(chunker);
        self
    }

    /// Create a reader for the given format
    pub fn create(&self, format: ReaderFormat) -> Result<Arc<dyn Reader>, DomainError> {
        match format {
            ReaderFormat::Text => Ok(Arc::new(TextReader::new())),
            ReaderFormat::Markdown => Ok(Arc::new(MarkdownReader::new())),
            ReaderFormat::Html => Ok(Arc::new(HtmlReader::new())),
            ReaderFormat::Json => Ok(Arc::new(JsonReader::new())),
            ReaderFormat::Csv => Ok(Arc::new(CsvReader::new())),
            ReaderFormat::Website => {
                let client = HttpClient::for_crawling(self.crawler.timeout(), CRAWLER_USER_AGENT)?;
                let mut reader = WebsiteReader::new(client, self.crawler.clone())?;

                if let Some(ref chunker) = self.website_chunker {
                    reader = reader.with_chunker(chunker.clone());
                }

                Ok(Arc::new(reader))
            }
            ReaderFormat::Pdf | ReaderFormat::Docx => Err(DomainError::configuration(format!(
                "No reader is available for the {} format",
                format
            ))),
        }
    }

    /// Get a list of formats with a reader
    pub fn supported_formats() -> Vec<ReaderFormat> {
        vec![
            ReaderFormat::Text,
            ReaderFormat::Markdown,
            ReaderFormat::Html,
            ReaderFormat::Json,
            ReaderFormat::Csv,
            ReaderFormat::Website,
        ]
    }
}
