//! In-memory transcript of the latest conversation per session.

use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ChatError;
use crate::models::Conversation;

/// Session used when a caller doesn't identify one.
pub const DEFAULT_SESSION: &str = "default";

/// Sessions retained before the least recently written one is evicted.
pub const MAX_SESSIONS: usize = 1000;

/// Latest conversation per session, bounded to a fixed number of sessions.
/// Cleared on restart.
#[derive(Debug)]
pub struct TranscriptStore {
    sessions: RwLock<LruCache<String, Conversation>>,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Replace the session's conversation. Last write wins.
    pub async fn record(&self, session: &str, conversation: Conversation) {
        let evicted = self
            .sessions
            .write()
            .await
            .push(session.to_string(), conversation);
        if let Some((evicted, _)) = evicted
            && evicted != session
        {
            debug!(session = %evicted, "Evicted least recently written transcript");
        }
    }

    /// Reads don't refresh recency; only writes keep a session alive.
    pub async fn current(&self, session: &str) -> Result<Conversation, ChatError> {
        self.sessions
            .read()
            .await
            .peek(session)
            .cloned()
            .ok_or(ChatError::NoTranscript)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Render as `User: ...` / `Jarvis: ...` lines separated by blank lines.
    pub async fn render(&self, session: &str) -> Result<String, ChatError> {
        let conversation = self.current(session).await?;
        Ok(conversation
            .iter()
            .map(|m| format!("{}: {}", m.role.transcript_label(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
