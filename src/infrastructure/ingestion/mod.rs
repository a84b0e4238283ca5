//! Document ingestion infrastructure
//!
//! This module provides reader and chunker implementations plus the
//! factories that resolve them from configuration.

pub mod chunkers;
pub mod factory;
pub mod readers;

// Re-export readers
pub use readers::{
    CrawlSession, CrawlerConfig, CsvReader, HtmlReader, JsonReader, MarkdownReader, TextReader,
    WebsiteReader,
};

// Re-export chunkers
pub use chunkers::{
    AgenticChunker, DocumentChunker, FixedSizeChunker, RecursiveChunker, SemanticChunker,
};

// Re-export factories
pub use factory::{ChunkerFactory, ReaderFactory};
