//! Storage contract every vector store backend implements

use std::fmt::Debug;

use async_trait::async_trait;

use super::document::Document;
use super::filter::Filters;
use crate::domain::error::DomainError;

/// Outcome of an insert or upsert
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    /// Number of documents that reached storage
    pub written: usize,
    /// Identity and reason for every document that did not
    pub errors: Vec<(String, String)>,
}

impl WriteResult {
    /// Create a fully successful result
    pub fn success(written: usize) -> Self {
        Self {
            written,
            errors: Vec::new(),
        }
    }

    /// Create a result with partial failures
    pub fn partial(written: usize, errors: Vec<(String, String)>) -> Self {
        Self { written, errors }
    }

    /// Number of documents that failed
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// Uniform collection lifecycle, dedup and search operations.
///
/// Semantics are identical across backends:
/// - `create` is idempotent
/// - `exists` never fails
/// - `drop_collection` and `delete` are no-ops on a missing collection
/// - `search` returns an empty list when the query cannot be embedded
/// - identity is the document id when present, else the content fingerprint
#[async_trait]
pub trait VectorDb: Send + Sync + Debug {
    /// Get the backend type name
    fn backend_name(&self) -> &'static str;

    /// Create the collection if it does not exist yet
    async fn create(&self) -> Result<(), DomainError>;

    /// Whether the collection exists
    async fn exists(&self) -> bool;

    /// Whether a document with the same identity is stored
    async fn doc_exists(&self, document: &Document) -> Result<bool, DomainError>;

    /// Whether any document with this name is stored
    async fn name_exists(&self, name: &str) -> Result<bool, DomainError>;

    /// Whether a document with this id is stored
    async fn id_exists(&self, id: &str) -> Result<bool, DomainError>;

    /// Append documents, embedding each one first.
    ///
    /// Callers filter existing documents beforehand; rows that collide with a
    /// stored identity are reported as failed, never replaced.
    async fn insert(
        &self,
        documents: Vec<Document>,
        filters: Option<&Filters>,
    ) -> Result<WriteResult, DomainError>;

    /// Whether `upsert` is supported by this backend
    fn upsert_available(&self) -> bool {
        false
    }

    /// Insert or replace documents keyed by identity
    async fn upsert(
        &self,
        _documents: Vec<Document>,
        _filters: Option<&Filters>,
    ) -> Result<WriteResult, DomainError> {
        Err(DomainError::configuration(format!(
            "Upsert is not available for the {} backend",
            self.backend_name()
        )))
    }

    /// Return the `limit` stored documents nearest to the query, most similar first
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filters: Option<&Filters>,
    ) -> Result<Vec<Document>, DomainError>;

    /// Remove the collection entirely
    async fn drop_collection(&self) -> Result<(), DomainError>;

    /// Remove every stored document, keeping the collection.
    ///
    /// Returns `false` when there was no collection to clear.
    async fn delete(&self) -> Result<bool, DomainError>;

    /// Backend-specific maintenance; a best-effort hint
    async fn optimize(&self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Number of stored documents
    async fn count(&self) -> Result<usize, DomainError>;
}
