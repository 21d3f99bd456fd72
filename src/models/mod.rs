mod chat;
mod config;
mod document;
mod health;
mod search;

pub use chat::{ChatMessage, ChatReply, Conversation, Role, SessionStats, SourceSnippet};
pub use config::{
    Config, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_BASE_URL,
    DEFAULT_LLM_MODEL, DEFAULT_PORT, EmbeddingConfig, LlmConfig, MAX_TEMPERATURE, ServerConfig,
    VectorStoreConfig,
};
pub use document::Document;
pub use health::{HealthStatus, ServiceState};
pub use search::{IndexMatch, IndexRecord, IndexStats, Metadata, OutputFormat, TEXT_KEY};
