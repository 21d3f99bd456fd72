//! CLI module for the Jarvis assistant.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Retrieval-augmented product assistant backed by a local LLM and a vector index.
#[derive(Debug, Parser)]
#[command(name = "jarvis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        default_value = "text",
        help = "Output format: text, json, or markdown"
    )]
    pub format: OutputFormat,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        short = 'c',
        global = true,
        env = "JARVIS_CONFIG",
        help = "Path to a config.toml file"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP backend (/chat, /health, /transcript)
    Serve(commands::ServeArgs),

    /// Embed documents and upsert them into the vector index
    Ingest(commands::IngestArgs),

    /// Ask a single question from the terminal
    Ask(commands::AskArgs),

    /// Check the language model and vector index
    Status,

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
