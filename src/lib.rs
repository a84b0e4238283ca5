//! PMP Knowledge
//!
//! Knowledge ingestion and retrieval pipeline with support for:
//! - Readers for text, markdown, HTML, JSON, CSV and crawled websites
//! - Fixed, recursive, document-aware, semantic and agentic chunking
//! - Fingerprint-based dedup against a uniform vector store contract
//! - Similarity search with an optional reranking hook

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{Embedder, LanguageModel, Source, VectorDb};
use infrastructure::{
    embedding::OpenAiEmbedder,
    ingestion::{ChunkerFactory, ReaderFactory},
    knowledge_base::{InMemoryVectorDb, KnowledgeBase},
    llm::{HttpClient, OpenAiChatModel},
};
use tracing::info;

/// Create the embedder described by the configuration
pub fn create_embedder(config: &AppConfig) -> anyhow::Result<Arc<dyn Embedder>> {
    let api_key = config
        .embedder
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("No embedder API key configured (APP__EMBEDDER__API_KEY or OPENAI_API_KEY)")
        })?;

    let mut embedder =
        OpenAiEmbedder::with_base_url(HttpClient::new(), api_key, &config.embedder.base_url)
            .with_model(&config.embedder.model);

    if let Some(dimensions) = config.embedder.dimensions {
        embedder = embedder.with_dimensions(dimensions);
    }

    info!(
        "Using OpenAI embedder {} at {}",
        config.embedder.model, config.embedder.base_url
    );
    Ok(Arc::new(embedder))
}

/// Create the language model used by agentic chunking, when a key is available
pub fn create_language_model(config: &AppConfig) -> Option<Arc<dyn LanguageModel>> {
    let api_key = config
        .llm
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())?;

    info!("Using OpenAI chat model {} for chunking", config.llm.model);
    Some(Arc::new(
        OpenAiChatModel::with_base_url(HttpClient::new(), api_key, &config.llm.base_url)
            .with_model(&config.llm.model),
    ))
}

/// Create the in-process vector store described by the configuration
pub fn create_vector_db(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Arc<dyn VectorDb> {
    Arc::new(
        InMemoryVectorDb::new(&config.vector_db.collection, embedder)
            .with_distance(config.vector_db.distance)
            .with_hash_algorithm(config.vector_db.hash_algorithm),
    )
}

/// Create a knowledge base over `sources` with the configured chunker and store
pub fn create_knowledge_base(
    config: &AppConfig,
    embedder: Arc<dyn Embedder>,
    language_model: Option<Arc<dyn LanguageModel>>,
    sources: Vec<Source>,
) -> anyhow::Result<KnowledgeBase> {
    let mut chunkers = ChunkerFactory::new(config.chunking.sizes())
        .with_similarity_threshold(config.chunking.similarity_threshold)
        .with_max_chunk_size(config.chunking.max_chunk_size)
        .with_embedder(embedder.clone());

    if let Some(model) = language_model {
        chunkers = chunkers.with_language_model(model);
    }

    let chunker = chunkers.create(config.chunking.strategy)?;
    let readers = ReaderFactory::new().with_crawler(config.crawler.clone());

    let mut knowledge = KnowledgeBase::new()
        .with_vector_db(create_vector_db(config, embedder))
        .with_chunker(chunker)
        .with_num_documents(config.knowledge.num_documents)
        .with_optimize_on(config.knowledge.optimize_on)
        .with_skip_indexed_sources(config.knowledge.skip_indexed_sources);

    for source in sources {
        knowledge = knowledge.with_source(source, &readers)?;
    }

    info!(
        "Knowledge base configured with {} sources and {} chunking",
        knowledge.sources().count(),
        config.chunking.strategy
    );

    Ok(knowledge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::embedding::MockEmbedder;
    use domain::{ChunkingType, LoadOptions, ReaderFormat};

    #[test]
    fn test_create_embedder_with_configured_key() {
        let mut config = AppConfig::default();
        config.embedder.api_key = Some("sk-test".to_string());
        config.embedder.dimensions = Some(256);

        let embedder = create_embedder(&config).unwrap();

        assert_eq!(embedder.provider_name(), "openai");
        assert_eq!(embedder.dimensions(), Some(256));
    }

    #[test]
    fn test_create_language_model_with_configured_key() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".to_string());

        assert!(create_language_model(&config).is_some());
    }

    #[test]
    fn test_create_knowledge_base_resolves_sources() {
        let config = AppConfig::default();
        let sources = vec![
            Source::new("notes.md", ReaderFormat::Markdown),
            Source::new("https://example.com", ReaderFormat::Website),
        ];

        let knowledge =
            create_knowledge_base(&config, Arc::new(MockEmbedder::new(8)), None, sources).unwrap();

        assert_eq!(knowledge.sources().count(), 2);
        assert_eq!(knowledge.num_documents(), 2);
    }

    #[test]
    fn test_create_knowledge_base_rejects_unusable_configuration() {
        let mut config = AppConfig::default();
        config.chunking.strategy = ChunkingType::Agentic;
        let embedder: Arc<dyn Embedder> = Arc::new(MockEmbedder::new(8));

        assert!(create_knowledge_base(&config, embedder.clone(), None, vec![]).is_err());

        let config = AppConfig::default();
        let pdf = vec![Source::new("paper.pdf", ReaderFormat::Pdf)];
        assert!(create_knowledge_base(&config, embedder, None, pdf).is_err());
    }

    #[tokio::test]
    async fn test_configured_knowledge_base_round_trip() {
        let mut config = AppConfig::default();
        config.chunking.chunk_size = 20;

        let knowledge =
            create_knowledge_base(&config, Arc::new(MockEmbedder::new(8)), None, vec![]).unwrap();

        let report = knowledge
            .load_text("Rust keeps memory safe without a garbage collector.", LoadOptions::default())
            .await
            .unwrap();

        assert_eq!(report.documents_written, 3);
        assert_eq!(knowledge.search("memory", Some(10), None).await.len(), 3);
    }
}
