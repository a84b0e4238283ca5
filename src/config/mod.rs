mod app_config;

pub use app_config::{
    AppConfig, ChunkingSettings, EmbedderConfig, KnowledgeConfig, LlmConfig, LogFormat,
    LoggingConfig, VectorDbConfig,
};
