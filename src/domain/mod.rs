//! Domain layer - Documents, chunking, readers and the storage contract

pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;

pub use embedding::{cosine_similarity, Distance, Embedder};
pub use error::DomainError;
pub use ingestion::{ChunkingConfig, ChunkingStrategy, ChunkingType, Reader, ReaderFormat};
pub use knowledge_base::{
    Document, Filters, HashAlgorithm, LoadOptions, LoadReport, Reranker, Source, VectorDb,
    WriteResult,
};
pub use llm::LanguageModel;
