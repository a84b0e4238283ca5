//! Knowledge base domain - documents, identity and the storage contract

mod document;
mod entity;
mod filter;
mod fingerprint;
mod provider;
mod reranker;

pub use document::{Document, META_CHUNK, META_CHUNK_SIZE, META_URL};
pub use entity::{LoadOptions, LoadReport, Source};
pub use filter::{filters_match, Filters};
pub use fingerprint::{clean_content, HashAlgorithm};
pub use provider::{VectorDb, WriteResult};
pub use reranker::Reranker;

#[cfg(test)]
pub use provider::mock::MockVectorDb;
#[cfg(test)]
pub use reranker::mock::ReversingReranker;
