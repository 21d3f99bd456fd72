//! Vector index abstraction.
//!
//! The orchestrator and ingestion talk to the index through [`VectorStore`];
//! Qdrant is the production backend.

mod qdrant;

pub use qdrant::QdrantBackend;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{IndexMatch, IndexRecord, IndexStats, VectorStoreConfig};

/// Nearest-neighbour store keyed by a collection name.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Liveness check. Any successful response means the index is reachable.
    async fn describe_stats(&self) -> Result<IndexStats, VectorStoreError>;

    /// Create the collection if it doesn't exist.
    async fn ensure_collection(&self) -> Result<(), VectorStoreError>;

    /// Insert or replace records by id.
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError>;

    /// Return up to `top_k` matches ordered by descending similarity.
    ///
    /// An empty result is not an error.
    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> Result<Vec<IndexMatch>, VectorStoreError>;

    /// Get the collection name.
    fn collection(&self) -> &str;
}

/// Create the configured vector store backend for vectors of `embedding_dim`.
pub fn create_backend(
    config: &VectorStoreConfig,
    embedding_dim: u64,
) -> Result<Arc<dyn VectorStore>, VectorStoreError> {
    let backend = QdrantBackend::new(config, embedding_dim)?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_backend_requires_url() {
        let config = VectorStoreConfig {
            collection: Some("jarvis".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            create_backend(&config, 384),
            Err(VectorStoreError::ConnectionError(_))
        ));
    }
}
