mod app_config;

pub use app_config::{
    AppConfig, EmbeddingConfig, EngineConfig, HttpConfig, LlmConfig, LogFormat, LoggingConfig,
};
