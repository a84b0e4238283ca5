//! Infrastructure layer - Readers, chunkers, providers and vector stores

pub mod embedding;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod logging;
