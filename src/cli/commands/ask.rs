use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::build_chat_service;
use crate::cli::output::get_formatter;
use crate::models::{Config, Conversation, OutputFormat};

#[derive(Debug, Args)]
pub struct AskArgs {
    #[arg(required = true, help = "Question to ask Jarvis")]
    pub question: String,

    #[arg(long, help = "JSON file with prior conversation turns")]
    pub history: Option<PathBuf>,
}

pub async fn handle_ask(
    args: AskArgs,
    config: Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let question = args.question.trim();
    if question.is_empty() {
        anyhow::bail!("question cannot be empty");
    }

    config.validate().context("invalid configuration")?;

    let history: Conversation = match args.history {
        Some(ref path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content).context("history must be a JSON array of messages")?
        }
        None => Vec::new(),
    };

    if verbose {
        eprintln!("Question: \"{question}\"");
        eprintln!("  History turns: {}", history.len());
        eprintln!("  Model: {}", config.llm.model);
    }

    let chat = build_chat_service(&config)?;
    let turn = chat.answer(question, &history).await?;

    let formatter = get_formatter(format);
    print!("{}", formatter.format_reply(&turn.reply));
    Ok(())
}
