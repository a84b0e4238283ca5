//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `Reader` trait turning a source location into documents
//! - `ChunkingStrategy` trait for splitting documents into chunks

pub mod chunker;
pub mod reader;

pub use chunker::{helpers, ChunkingConfig, ChunkingStrategy, ChunkingType};
pub use reader::{Reader, ReaderFormat};

// Re-export mocks for testing
#[cfg(test)]
pub use chunker::mock::MockChunkingStrategy;
#[cfg(test)]
pub use reader::mock::MockReader;
