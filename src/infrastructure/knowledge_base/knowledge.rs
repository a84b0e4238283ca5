//! Knowledge base loader: reads sources, chunks them and keeps the vector store current

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::domain::ingestion::{ChunkingStrategy, Reader};
use crate::domain::knowledge_base::{
    Document, Filters, LoadOptions, LoadReport, Reranker, Source, VectorDb,
};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::ReaderFactory;

/// Default number of documents returned by search
pub const DEFAULT_NUM_DOCUMENTS: usize = 2;

/// Default write count above which the store is optimized after a load
pub const DEFAULT_OPTIMIZE_ON: usize = 1000;

/// A source with the reader resolved for its format
#[derive(Debug, Clone)]
struct ConfiguredSource {
    source: Source,
    reader: Arc<dyn Reader>,
}

/// Searchable knowledge base backed by a vector store.
///
/// Owns no documents: the vector store holds the durable copy.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    sources: Vec<ConfiguredSource>,
    chunker: Option<Arc<dyn ChunkingStrategy>>,
    vector_db: Option<Arc<dyn VectorDb>>,
    reranker: Option<Arc<dyn Reranker>>,
    num_documents: usize,
    optimize_on: Option<usize>,
    skip_indexed_sources: bool,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            chunker: None,
            vector_db: None,
            reranker: None,
            num_documents: DEFAULT_NUM_DOCUMENTS,
            optimize_on: Some(DEFAULT_OPTIMIZE_ON),
            skip_indexed_sources: false,
        }
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vector store holding this knowledge base
    pub fn with_vector_db(mut self, vector_db: Arc<dyn VectorDb>) -> Self {
        self.vector_db = Some(vector_db);
        self
    }

    /// Add a source, resolving its reader from the format tag
    pub fn with_source(mut self, source: Source, readers: &ReaderFactory) -> Result<Self, DomainError> {
        let reader = readers.create(source.format)?;
        self.sources.push(ConfiguredSource { source, reader });
        Ok(self)
    }

    /// Add a source read by an explicit reader
    pub fn with_source_reader(mut self, source: Source, reader: Arc<dyn Reader>) -> Self {
        self.sources.push(ConfiguredSource { source, reader });
        self
    }

    /// Chunk every document read from the sources
    pub fn with_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Post-process search results
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn with_num_documents(mut self, num_documents: usize) -> Self {
        self.num_documents = num_documents;
        self
    }

    /// Optimize the store after a load writing more than `threshold` documents
    pub fn with_optimize_on(mut self, threshold: Option<usize>) -> Self {
        self.optimize_on = threshold;
        self
    }

    /// Skip reading sources whose location is already stored as a document name
    pub fn with_skip_indexed_sources(mut self, skip: bool) -> Self {
        self.skip_indexed_sources = skip;
        self
    }

    /// Configured sources in load order
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().map(|configured| &configured.source)
    }

    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    pub fn optimize_on(&self) -> Option<usize> {
        self.optimize_on
    }

    fn vector_db(&self) -> Result<&Arc<dyn VectorDb>, DomainError> {
        self.vector_db
            .as_ref()
            .ok_or_else(|| DomainError::configuration("No vector db configured for knowledge base"))
    }

    /// One batch per source, read in order
    pub fn document_lists(
        &self,
    ) -> BoxStream<'_, (&Source, Result<Vec<Document>, DomainError>)> {
        Self::read_sources(self.sources.iter().collect())
    }

    fn read_sources(
        sources: Vec<&ConfiguredSource>,
    ) -> BoxStream<'_, (&Source, Result<Vec<Document>, DomainError>)> {
        stream::iter(sources)
            .then(|configured| async move {
                debug!(
                    source = %configured.source.location,
                    reader = configured.reader.name(),
                    "Reading source"
                );
                let result = configured.reader.read(&configured.source.location).await;
                (&configured.source, result)
            })
            .boxed()
    }

    /// Load every source into the vector store
    pub async fn load(&self, options: LoadOptions) -> Result<LoadReport, DomainError> {
        let vector_db = self.vector_db()?;

        if self.sources.is_empty() {
            return Err(DomainError::configuration("Knowledge base has no sources"));
        }

        if options.recreate {
            info!(backend = vector_db.backend_name(), "Dropping collection");
            vector_db.drop_collection().await?;
        }

        info!(backend = vector_db.backend_name(), "Creating collection");
        vector_db.create().await?;

        let mut report = LoadReport::started();
        let pending = self.pending_sources(vector_db.as_ref(), &options, &mut report).await;

        info!(sources = pending.len(), "Loading knowledge base");

        let mut batches = Self::read_sources(pending);
        while let Some((source, result)) = batches.next().await {
            let documents = match result {
                Ok(documents) => documents,
                Err(e) => {
                    warn!(source = %source.location, error = %e, "Failed to read source");
                    report.sources_failed += 1;
                    continue;
                }
            };

            let documents = self.chunk_batch(documents).await;
            report.documents_read += documents.len();

            let batch = Self::write_batch(vector_db.as_ref(), documents, &options).await;
            info!(
                source = %source.location,
                written = batch.documents_written,
                skipped = batch.documents_skipped,
                "Added documents to knowledge base"
            );
            report.merge(&batch);
        }

        self.optimize_if_needed(vector_db.as_ref(), report.documents_written)
            .await;

        let report = report.complete();
        info!(
            written = report.documents_written,
            skipped = report.documents_skipped,
            failed = report.documents_failed,
            duration_ms = report.duration_ms(),
            "Knowledge base loaded"
        );

        Ok(report)
    }

    /// Load an in-memory batch with the same write policy as `load`
    pub async fn load_documents(
        &self,
        documents: Vec<Document>,
        options: LoadOptions,
    ) -> Result<LoadReport, DomainError> {
        let vector_db = self.vector_db()?;

        debug!(backend = vector_db.backend_name(), "Creating collection");
        vector_db.create().await?;

        let mut report = LoadReport::started();
        let documents = self.chunk_batch(documents).await;
        report.documents_read = documents.len();

        let batch = Self::write_batch(vector_db.as_ref(), documents, &options).await;
        report.merge(&batch);

        if report.documents_written == 0 {
            info!("No new documents to load");
        } else {
            info!(written = report.documents_written, "Loaded documents to knowledge base");
        }

        self.optimize_if_needed(vector_db.as_ref(), report.documents_written)
            .await;

        Ok(report.complete())
    }

    pub async fn load_document(
        &self,
        document: Document,
        options: LoadOptions,
    ) -> Result<LoadReport, DomainError> {
        self.load_documents(vec![document], options).await
    }

    pub async fn load_text(
        &self,
        text: impl Into<String>,
        options: LoadOptions,
    ) -> Result<LoadReport, DomainError> {
        self.load_document(Document::new(text), options).await
    }

    /// Load a document from its JSON representation
    pub async fn load_json(&self, json: &str, options: LoadOptions) -> Result<LoadReport, DomainError> {
        let document = Document::from_json(json)?;
        self.load_document(document, options).await
    }

    /// Load a document from a JSON object such as `{"content": ..., "meta_data": {...}}`
    pub async fn load_value(
        &self,
        value: serde_json::Value,
        options: LoadOptions,
    ) -> Result<LoadReport, DomainError> {
        let document = Document::from_value(value)?;
        self.load_document(document, options).await
    }

    /// Return relevant documents for a query; empty when searching fails
    pub async fn search(
        &self,
        query: &str,
        num_documents: Option<usize>,
        filters: Option<&Filters>,
    ) -> Vec<Document> {
        let Some(ref vector_db) = self.vector_db else {
            warn!("No vector db provided");
            return Vec::new();
        };

        let limit = num_documents.unwrap_or(self.num_documents);
        debug!(limit, query, "Getting relevant documents");

        let documents = match vector_db.search(query, limit, filters).await {
            Ok(documents) => documents,
            Err(e) => {
                error!(error = %e, "Error searching for documents");
                return Vec::new();
            }
        };

        match self.reranker {
            Some(ref reranker) => reranker.rerank(query, documents),
            None => documents,
        }
    }

    /// Whether the backing collection exists
    pub async fn exists(&self) -> bool {
        match self.vector_db {
            Some(ref vector_db) => vector_db.exists().await,
            None => {
                warn!("No vector db provided");
                false
            }
        }
    }

    /// Clear every stored document
    pub async fn delete(&self) -> Result<bool, DomainError> {
        self.vector_db()?.delete().await
    }

    async fn pending_sources(
        &self,
        vector_db: &dyn VectorDb,
        options: &LoadOptions,
        report: &mut LoadReport,
    ) -> Vec<&ConfiguredSource> {
        if !self.skip_indexed_sources || options.recreate || options.upsert {
            return self.sources.iter().collect();
        }

        let mut pending = Vec::with_capacity(self.sources.len());

        for configured in &self.sources {
            match vector_db.name_exists(&configured.source.location).await {
                Ok(true) => {
                    info!(source = %configured.source.location, "Source already indexed, skipping");
                    report.sources_skipped += 1;
                }
                Ok(false) => pending.push(configured),
                Err(e) => {
                    warn!(source = %configured.source.location, error = %e, "Indexed check failed");
                    pending.push(configured);
                }
            }
        }

        pending
    }

    async fn chunk_batch(&self, documents: Vec<Document>) -> Vec<Document> {
        let Some(ref chunker) = self.chunker else {
            return documents;
        };

        let mut chunks = Vec::with_capacity(documents.len());

        for document in documents {
            if document.is_chunked() {
                chunks.push(document);
                continue;
            }

            match chunker.chunk(&document).await {
                Ok(produced) => chunks.extend(produced),
                Err(e) => {
                    warn!(chunker = chunker.name(), error = %e, "Chunking failed, keeping document whole");
                    chunks.push(document);
                }
            }
        }

        chunks
    }

    /// Write one batch following the upsert / skip-existing policy
    async fn write_batch(
        vector_db: &dyn VectorDb,
        documents: Vec<Document>,
        options: &LoadOptions,
    ) -> LoadReport {
        let mut report = LoadReport::default();

        if documents.is_empty() {
            return report;
        }

        let filters = options.filters.as_ref();

        if options.upsert && vector_db.upsert_available() {
            let count = documents.len();
            match vector_db.upsert(documents, filters).await {
                Ok(result) => {
                    report.documents_written = result.written;
                    report.documents_failed = result.failed();
                }
                Err(e) => {
                    error!(error = %e, "Failed to upsert documents");
                    report.documents_failed = count;
                }
            }
            return report;
        }

        if options.upsert {
            debug!(backend = vector_db.backend_name(), "Upsert not available, inserting");
        }

        let documents = if options.skip_existing {
            let mut new_documents = Vec::with_capacity(documents.len());

            for document in documents {
                match vector_db.doc_exists(&document).await {
                    Ok(true) => report.documents_skipped += 1,
                    Ok(false) => new_documents.push(document),
                    Err(e) => {
                        warn!(error = %e, "Existence check failed, treating document as new");
                        new_documents.push(document);
                    }
                }
            }

            new_documents
        } else {
            documents
        };

        if documents.is_empty() {
            return report;
        }

        let count = documents.len();
        match vector_db.insert(documents, filters).await {
            Ok(result) => {
                for (identity, reason) in &result.errors {
                    debug!(identity = %identity, reason = %reason, "Document not inserted");
                }
                report.documents_written = result.written;
                report.documents_failed = result.failed();
            }
            Err(e) => {
                error!(error = %e, "Failed to insert documents");
                report.documents_failed = count;
            }
        }

        report
    }

    async fn optimize_if_needed(&self, vector_db: &dyn VectorDb, written: usize) {
        let Some(threshold) = self.optimize_on else {
            return;
        };

        if written > threshold {
            info!(written, threshold, "Optimizing vector db");
            if let Err(e) = vector_db.optimize().await {
                warn!(error = %e, "Vector db optimization failed");
            }
        }
    }
}
