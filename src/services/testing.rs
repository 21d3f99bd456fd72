//! In-memory stand-ins for the embedding model, vector index and language model.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{EmbeddingError, LlmError, VectorStoreError};
use crate::models::{IndexMatch, IndexRecord, IndexStats, Metadata, TEXT_KEY};
use crate::services::embedding::EmbeddingProvider;
use crate::services::llm::{ChatModel, Completion, PromptMessage};
use crate::services::vector_store::VectorStore;

pub struct FakeEmbedder {
    pub fail: bool,
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::LoadError("model.onnx missing".to_string()));
        }
        Ok(vec![text.len() as f32, 1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        3
    }
}

pub fn hit(id: Option<&str>, text: Option<&str>, score: f32) -> IndexMatch {
    let mut metadata = Metadata::new();
    if let Some(text) = text {
        metadata.insert(TEXT_KEY.to_string(), text.to_string());
    }
    IndexMatch {
        id: id.map(str::to_string),
        score,
        metadata,
    }
}

#[derive(Default)]
pub struct FakeIndex {
    pub matches: Vec<IndexMatch>,
    pub fail: bool,
    pub upserted: Mutex<Vec<IndexRecord>>,
    pub last_top_k: Mutex<Option<u64>>,
}

impl FakeIndex {
    pub fn with_matches(matches: Vec<IndexMatch>) -> Self {
        Self {
            matches,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl VectorStore for FakeIndex {
    async fn describe_stats(&self) -> Result<IndexStats, VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::ConnectionError("connection refused".to_string()));
        }
        Ok(IndexStats {
            points_count: self.matches.len() as u64,
        })
    }

    async fn ensure_collection(&self) -> Result<(), VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::CollectionError("connection refused".to_string()));
        }
        Ok(())
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::UpsertError("connection refused".to_string()));
        }
        self.upserted.lock().unwrap().extend(records);
        Ok(())
    }

    async fn query(
        &self,
        _vector: Vec<f32>,
        top_k: u64,
    ) -> Result<Vec<IndexMatch>, VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::SearchError("connection refused".to_string()));
        }
        *self.last_top_k.lock().unwrap() = Some(top_k);
        Ok(self.matches.iter().take(top_k as usize).cloned().collect())
    }

    fn collection(&self) -> &str {
        "test-docs"
    }
}

pub struct FakeLlm {
    pub reply: Result<Completion, u16>,
    pub healthy: bool,
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl FakeLlm {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Ok(Completion {
                content: content.to_string(),
                total_tokens: None,
            }),
            healthy: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            healthy: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Vec<PromptMessage> {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for FakeLlm {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<Completion, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(completion) => Ok(completion.clone()),
            Err(status) => Err(LlmError::ServerError {
                status: *status,
                body: "upstream exploded".to_string(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}
