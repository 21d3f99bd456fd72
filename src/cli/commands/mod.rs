mod ask;
mod config;
mod ingest;
mod serve;
mod status;

pub use ask::AskArgs;
pub use config::ConfigCommand;
pub use ingest::IngestArgs;
pub use serve::ServeArgs;

pub use ask::handle_ask;
pub use config::handle_config;
pub use ingest::handle_ingest;
pub use serve::handle_serve;
pub use status::handle_status;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::Config;
use crate::services::{ChatService, LmStudioClient, LocalEmbedder, create_backend};

/// Wire the embedder, vector index and language model from configuration.
///
/// Nothing touches the network or loads the model here.
pub(crate) fn build_chat_service(config: &Config) -> Result<ChatService> {
    let embedder = LocalEmbedder::new(&config.embedding);
    let index = create_backend(
        &config.vector_store,
        u64::from(config.embedding.dimension),
    )
    .context("failed to create vector index client")?;
    let llm = LmStudioClient::new(&config.llm).context("failed to create language model client")?;

    Ok(ChatService::new(Arc::new(embedder), index, Arc::new(llm)))
}
