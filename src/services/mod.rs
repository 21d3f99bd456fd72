pub mod chat;
pub mod embedding;
pub mod ingest;
pub mod llm;
pub mod prompt;
pub mod transcript;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::{ChatService, ChatTurn, TOP_K};
pub use embedding::{EmbeddingModel, EmbeddingProvider, LocalEmbedder, SentenceEncoder};
pub use ingest::{IngestStats, ingest_documents, parse_documents};
pub use llm::{ChatModel, Completion, LmStudioClient, PromptMessage, PromptRole};
pub use transcript::{DEFAULT_SESSION, TranscriptStore};
pub use vector_store::{QdrantBackend, VectorStore, create_backend};
