//! In-memory vector store for development and testing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::embedding::{Distance, Embedder};
use crate::domain::knowledge_base::{
    clean_content, filters_match, Document, Filters, HashAlgorithm, VectorDb, WriteResult,
};
use crate::domain::DomainError;

/// In-process vector store implementing the full storage contract
#[derive(Debug)]
pub struct InMemoryVectorDb {
    collection: String,
    embedder: Arc<dyn Embedder>,
    distance: Distance,
    hash_algorithm: HashAlgorithm,
    rows: Arc<RwLock<Option<Vec<StoredDoc>>>>,
}

#[derive(Debug, Clone)]
struct StoredDoc {
    identity: String,
    document: Document,
    filters: Option<Filters>,
}

impl InMemoryVectorDb {
    /// Create a new in-memory vector store; the collection starts absent
    pub fn new(collection: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            collection: collection.into(),
            embedder,
            distance: Distance::default(),
            hash_algorithm: HashAlgorithm::default(),
            rows: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the distance metric used by search
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    /// Set the fingerprint algorithm used for identity
    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }

    /// Get the collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn missing_collection(&self) -> DomainError {
        DomainError::storage(format!("Collection '{}' does not exist", self.collection))
    }

    /// Clean and embed each document, splitting off the ones that cannot be stored
    async fn prepare(
        &self,
        documents: Vec<Document>,
        filters: Option<&Filters>,
    ) -> (Vec<StoredDoc>, Vec<(String, String)>) {
        let mut prepared = Vec::with_capacity(documents.len());
        let mut errors = Vec::new();

        for mut document in documents {
            document.content = clean_content(&document.content);
            let identity = self.hash_algorithm.identity(&document);

            if !document.embed(self.embedder.as_ref()).await {
                errors.push((identity, "embedding unavailable".to_string()));
                continue;
            }

            prepared.push(StoredDoc {
                identity,
                document,
                filters: filters.cloned(),
            });
        }

        (prepared, errors)
    }
}

#[async_trait]
impl VectorDb for InMemoryVectorDb {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn create(&self) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;

        if rows.is_none() {
            debug!(collection = %self.collection, "Creating collection");
            *rows = Some(Vec::new());
        }

        Ok(())
    }

    async fn exists(&self) -> bool {
        self.rows.read().await.is_some()
    }

    async fn doc_exists(&self, document: &Document) -> Result<bool, DomainError> {
        let identity = self.hash_algorithm.identity(document);

        Ok(self
            .rows
            .read()
            .await
            .as_ref()
            .is_some_and(|rows| rows.iter().any(|row| row.identity == identity)))
    }

    async fn name_exists(&self, name: &str) -> Result<bool, DomainError> {
        Ok(self.rows.read().await.as_ref().is_some_and(|rows| {
            rows.iter()
                .any(|row| row.document.name.as_deref() == Some(name))
        }))
    }

    async fn id_exists(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.rows.read().await.as_ref().is_some_and(|rows| {
            rows.iter()
                .any(|row| row.document.id.as_deref() == Some(id))
        }))
    }

    async fn insert(
        &self,
        documents: Vec<Document>,
        filters: Option<&Filters>,
    ) -> Result<WriteResult, DomainError> {
        if !self.exists().await {
            return Err(self.missing_collection());
        }

        let (prepared, mut errors) = self.prepare(documents, filters).await;

        let mut guard = self.rows.write().await;
        let rows = guard.as_mut().ok_or_else(|| self.missing_collection())?;
        let mut written = 0;

        for doc in prepared {
            if rows.iter().any(|row| row.identity == doc.identity) {
                errors.push((doc.identity, "document already exists".to_string()));
                continue;
            }

            rows.push(doc);
            written += 1;
        }

        debug!(collection = %self.collection, written, failed = errors.len(), "Inserted documents");

        Ok(WriteResult::partial(written, errors))
    }

    fn upsert_available(&self) -> bool {
        true
    }

    async fn upsert(
        &self,
        documents: Vec<Document>,
        filters: Option<&Filters>,
    ) -> Result<WriteResult, DomainError> {
        if !self.exists().await {
            return Err(self.missing_collection());
        }

        let (prepared, errors) = self.prepare(documents, filters).await;

        let mut guard = self.rows.write().await;
        let rows = guard.as_mut().ok_or_else(|| self.missing_collection())?;
        let written = prepared.len();

        for doc in prepared {
            match rows.iter_mut().find(|row| row.identity == doc.identity) {
                Some(existing) => *existing = doc,
                None => rows.push(doc),
            }
        }

        debug!(collection = %self.collection, written, failed = errors.len(), "Upserted documents");

        Ok(WriteResult::partial(written, errors))
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        filters: Option<&Filters>,
    ) -> Result<Vec<Document>, DomainError> {
        if limit == 0 || !self.exists().await {
            return Ok(vec![]);
        }

        let query_embedding = self.embedder.get_embedding(query).await;

        if query_embedding.is_empty() {
            warn!(collection = %self.collection, "No embedding for search query");
            return Ok(vec![]);
        }

        let rows = self.rows.read().await;
        let Some(rows) = rows.as_ref() else {
            return Ok(vec![]);
        };

        let mut scored: Vec<(f32, &Document)> = rows
            .iter()
            .filter(|row| filters_match(row.filters.as_ref(), filters))
            .filter_map(|row| {
                let embedding = row.document.embedding.as_ref()?;
                Some((self.distance.between(&query_embedding, embedding), &row.document))
            })
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, document)| document.clone())
            .collect())
    }

    async fn drop_collection(&self) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;

        if rows.take().is_some() {
            debug!(collection = %self.collection, "Dropped collection");
        }

        Ok(())
    }

    async fn delete(&self) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().await;

        match rows.as_mut() {
            Some(rows) => {
                rows.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn optimize(&self) -> Result<(), DomainError> {
        debug!(collection = %self.collection, "Nothing to optimize for in-memory collection");
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.rows.read().await.as_ref().map_or(0, Vec::len))
    }
}
