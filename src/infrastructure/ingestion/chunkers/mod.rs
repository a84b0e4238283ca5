//! Chunking strategy implementations

mod agentic;
mod document;
mod fixed_size;
mod recursive;
mod semantic;

pub use agentic::{AgenticChunker, DEFAULT_MAX_CHUNK_SIZE};
pub use document::DocumentChunker;
pub use fixed_size::FixedSizeChunker;
pub use recursive::RecursiveChunker;
pub use semantic::{SemanticChunker, DEFAULT_SIMILARITY_THRESHOLD};
