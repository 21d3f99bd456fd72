//! Retrieval-augmented chat orchestration.
//!
//! A turn runs embed, then vector query, then completion, strictly in that
//! order. Any downstream failure aborts the turn with a typed [`ChatError`];
//! nothing is retried here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::ChatError;
use crate::models::{
    ChatMessage, ChatReply, Conversation, HealthStatus, IndexMatch, SessionStats, SourceSnippet,
};
use crate::services::embedding::EmbeddingProvider;
use crate::services::llm::ChatModel;
use crate::services::prompt::build_messages;
use crate::services::vector_store::VectorStore;

/// Number of snippets retrieved per question.
pub const TOP_K: u64 = 3;

/// Result of a chat turn: the reply for the caller and the conversation to record.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub reply: ChatReply,
    pub conversation: Conversation,
}

pub struct ChatService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorStore>,
    llm: Arc<dyn ChatModel>,
}

impl ChatService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorStore>,
        llm: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
        }
    }

    /// Answer `message` grounded in retrieved snippets, given the prior `history`.
    pub async fn answer(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ChatTurn, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::InvalidInput(
                "message must be a non-empty string".to_string(),
            ));
        }

        let embedding = self.embedder.embed(message).await?;

        let matches = self.index.query(embedding, TOP_K).await?;
        let sources = to_sources(matches);
        debug!(count = sources.len(), "Retrieved context snippets");

        let prompt = build_messages(history, &sources, message);
        let completion = self.llm.complete(&prompt).await?;

        let mut conversation = history.to_vec();
        conversation.push(ChatMessage::user(message));
        conversation.push(ChatMessage::assistant(completion.content.clone()));

        let stats = SessionStats {
            total_tokens: completion.total_tokens,
            total_turns: conversation.len(),
            session_started_at: Utc::now(),
        };

        Ok(ChatTurn {
            reply: ChatReply {
                answer: completion.content,
                sources,
                stats,
            },
            conversation,
        })
    }

    /// Check the language model and the vector index concurrently.
    pub async fn health(&self) -> HealthStatus {
        let (llm, vector_db) = tokio::join!(self.llm.health_check(), self.index.describe_stats());
        if let Err(ref e) = vector_db {
            warn!(error = %e, "Vector index health check failed");
        }
        HealthStatus {
            llm: llm.into(),
            vector_db: vector_db.is_ok().into(),
        }
    }
}

fn to_sources(matches: Vec<IndexMatch>) -> Vec<SourceSnippet> {
    matches
        .into_iter()
        .take(TOP_K as usize)
        .enumerate()
        .map(|(i, m)| SourceSnippet {
            snippet: m.text().unwrap_or_default().to_string(),
            id: m
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("source-{}", i + 1)),
        })
        .collect()
}
