use anyhow::Result;
use console::style;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat, ServiceState};
use crate::services::{ChatModel, LmStudioClient, create_backend};

/// Check both dependencies concurrently. Always exits successfully.
pub async fn handle_status(config: Config, format: OutputFormat, verbose: bool) -> Result<()> {
    let formatter = get_formatter(format);

    if verbose {
        eprintln!("Checking language model at {}", config.llm.base_url);
        eprintln!(
            "Checking vector index at {}",
            config.vector_store.url.as_deref().unwrap_or("(unset)")
        );
        eprintln!(
            "  Timeouts: {}s (LLM), {}s (vector index)",
            config.llm.timeout_secs, config.vector_store.timeout_secs
        );
    }

    let llm_check = async {
        match LmStudioClient::new(&config.llm) {
            Ok(client) => client.health_check().await,
            Err(_) => false,
        }
    };

    let index_check = async {
        let index = create_backend(
            &config.vector_store,
            u64::from(config.embedding.dimension),
        )
        .ok()?;
        index.describe_stats().await.ok()
    };

    let (llm_online, index_stats) = tokio::join!(llm_check, index_check);

    let status = StatusInfo {
        llm: ServiceState::from(llm_online),
        llm_url: config.llm.base_url.clone(),
        llm_model: config.llm.model.clone(),
        vector_db: ServiceState::from(index_stats.is_some()),
        vector_url: config.vector_store.url.clone().unwrap_or_default(),
        collection: config.vector_store.collection.clone().unwrap_or_default(),
        points: index_stats.map(|s| s.points_count),
    };

    print!("{}", formatter.format_status(&status));

    if !status.llm.is_online() || !status.vector_db.is_online() {
        eprintln!();
        if !status.llm.is_online() {
            eprintln!(
                "{} language model offline. Start LM Studio and load '{}'.",
                style("Warning:").yellow(),
                config.llm.model
            );
        }
        if !status.vector_db.is_online() {
            eprintln!(
                "{} vector index unreachable. Check JARVIS_VECTOR_URL and JARVIS_COLLECTION.",
                style("Warning:").yellow()
            );
        }
    }

    Ok(())
}
