//! Error types for the Jarvis assistant.

use thiserror::Error;

/// Errors related to the local embedding model.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("failed to load embedding model: {0}")]
    LoadError(String),

    #[error("tokenizer error: {0}")]
    TokenizerError(String),

    #[error("inference error: {0}")]
    InferenceError(String),
}

/// Errors related to vector index operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to Qdrant: {0}")]
    ConnectionError(String),

    #[error("collection error: {0}")]
    CollectionError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("search error: {0}")]
    SearchError(String),
}

/// Errors related to the language model endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to reach language model endpoint: {0}")]
    ConnectionError(String),

    #[error("language model error: status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("invalid language model response: {0}")]
    InvalidResponse(String),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors surfaced by a chat turn or a transcript lookup.
///
/// Every variant maps to one response category at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    #[error("vector index unavailable: {0}")]
    IndexUnavailable(#[from] VectorStoreError),

    #[error("language model unavailable: {0}")]
    LlmUnavailable(#[from] LlmError),

    #[error("no transcript recorded")]
    NoTranscript,
}

/// Errors related to batch ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error at line {line}: {source}")]
    JsonParseError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downstream_errors_convert_into_chat_categories() {
        let err: ChatError = EmbeddingError::LoadError("missing onnx".to_string()).into();
        assert!(matches!(err, ChatError::EmbeddingUnavailable(_)));

        let err: ChatError = VectorStoreError::SearchError("timeout".to_string()).into();
        assert!(matches!(err, ChatError::IndexUnavailable(_)));

        let err: ChatError = LlmError::ServerError {
            status: 503,
            body: "loading".to_string(),
        }
        .into();
        assert!(matches!(err, ChatError::LlmUnavailable(_)));
    }

    #[test]
    fn test_llm_error_keeps_raw_body() {
        let err = LlmError::ServerError {
            status: 500,
            body: "model crashed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "language model error: status 500: model crashed"
        );
    }
}
