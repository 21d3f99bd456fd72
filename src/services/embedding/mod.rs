//! Embedding provider backed by a lazily loaded local model.
//!
//! The model is loaded on first use and shared for the rest of the process.
//! Concurrent first callers all await the same initialization, so the model
//! is never loaded twice. A failed load is not cached.

mod onnx;

pub use onnx::EmbeddingModel;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;

/// Converts text into fixed-length vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, preserving order.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in &texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Length of every vector this provider produces.
    fn dimension(&self) -> usize;
}

/// Synchronous, blocking sentence encoder.
pub trait SentenceEncoder: Send + Sync + 'static {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

type Loader<M> = Arc<dyn Fn() -> Result<M, EmbeddingError> + Send + Sync>;

pub struct LocalEmbedder<M: SentenceEncoder = EmbeddingModel> {
    model: OnceCell<Arc<M>>,
    loader: Loader<M>,
    dimension: usize,
}

impl LocalEmbedder<EmbeddingModel> {
    /// Embedder for the configured ONNX model; nothing is read from disk until first use.
    pub fn new(config: &EmbeddingConfig) -> Self {
        let config = config.clone();
        let dimension = config.dimension as usize;
        Self::with_loader(dimension, move || {
            let model_dir = config.model_dir().ok_or_else(|| {
                EmbeddingError::NotFound("could not determine models directory".to_string())
            })?;
            info!(
                model = %config.model_id,
                path = %model_dir.display(),
                "Loading embedding model"
            );
            let model = EmbeddingModel::load(&config, &model_dir)?;
            info!(dimension = config.dimension, "Embedding model loaded");
            Ok(model)
        })
    }
}

impl<M: SentenceEncoder> LocalEmbedder<M> {
    pub fn with_loader<F>(dimension: usize, loader: F) -> Self
    where
        F: Fn() -> Result<M, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            model: OnceCell::new(),
            loader: Arc::new(loader),
            dimension,
        }
    }

    /// Whether the model has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<M>, EmbeddingError> {
        self.model
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                let model = tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|e| EmbeddingError::LoadError(format!("load task failed: {e}")))??;
                Ok::<_, EmbeddingError>(Arc::new(model))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl<M: SentenceEncoder> EmbeddingProvider for LocalEmbedder<M> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::InferenceError("empty embedding output".to_string()))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let count = texts.len();
        let embeddings = tokio::task::spawn_blocking(move || model.encode(&texts))
            .await
            .map_err(|e| EmbeddingError::InferenceError(format!("inference task failed: {e}")))??;

        if embeddings.len() != count {
            return Err(EmbeddingError::InferenceError(format!(
                "expected {} embeddings, got {}",
                count,
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(EmbeddingError::InferenceError(format!(
                "embedding has {} dimensions, expected {}",
                bad.len(),
                self.dimension
            )));
        }

        debug!(count, "Embedded texts");
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
