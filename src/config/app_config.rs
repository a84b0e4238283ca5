use serde::Deserialize;

use crate::domain::embedding::Distance;
use crate::domain::ingestion::{ChunkingConfig, ChunkingType};
use crate::domain::knowledge_base::HashAlgorithm;
use crate::infrastructure::ingestion::CrawlerConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub chunking: ChunkingSettings,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub vector_db: VectorDbConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub num_documents: usize,
    pub optimize_on: Option<usize>,
    pub skip_indexed_sources: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub strategy: ChunkingType,
    pub chunk_size: usize,
    pub overlap: usize,
    pub similarity_threshold: f32,
    pub max_chunk_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    pub collection: String,
    pub distance: Distance,
    pub hash_algorithm: HashAlgorithm,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub dimensions: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            num_documents: 2,
            optimize_on: Some(1000),
            skip_indexed_sources: false,
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        let sizes = ChunkingConfig::default();

        Self {
            strategy: ChunkingType::default(),
            chunk_size: sizes.chunk_size,
            overlap: sizes.overlap,
            similarity_threshold: 0.5,
            max_chunk_size: 5000,
        }
    }
}

impl ChunkingSettings {
    /// Size settings shared by the deterministic strategies
    pub fn sizes(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.overlap)
    }
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            collection: "knowledge".to_string(),
            distance: Distance::default(),
            hash_algorithm: HashAlgorithm::default(),
        }
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            dimensions: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load `.env` into the environment, then the layered configuration
    pub fn load_with_dotenv() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load()
    }
}
