//! Ingest command implementation.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::get_formatter;
use crate::error::IngestError;
use crate::models::{Config, OutputFormat};
use crate::services::{LocalEmbedder, create_backend, ingest_documents, parse_documents};

/// Arguments for the ingest command.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to a JSON array or JSONL file of `{ "id", "text" }` documents (use - for stdin)
    #[arg()]
    pub file: Option<PathBuf>,

    /// Only validate the input without indexing
    #[arg(long)]
    pub validate_only: bool,
}

pub async fn handle_ingest(
    args: IngestArgs,
    config: Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);

    let input = read_input(args.file.as_deref()).context("failed to read documents")?;
    let documents = parse_documents(&input).context("failed to parse documents")?;

    if documents.is_empty() {
        println!(
            "{}",
            formatter.format_message("No documents found in input.")
        );
        return Ok(());
    }

    if verbose || args.validate_only {
        eprintln!("Found {} documents to ingest", documents.len());
    }

    if args.validate_only {
        println!(
            "{}",
            formatter.format_message(&format!(
                "Validation successful: {} documents ready for ingestion",
                documents.len()
            ))
        );
        return Ok(());
    }

    config.validate().context("invalid configuration")?;

    let embedder = LocalEmbedder::new(&config.embedding);
    let index = create_backend(
        &config.vector_store,
        u64::from(config.embedding.dimension),
    )?;

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let result = ingest_documents(&embedder, index.as_ref(), documents, |n| pb.inc(n as u64)).await;
    pb.finish_and_clear();
    let stats = result.context("ingestion failed")?;

    print!("{}", formatter.format_ingest_stats(&stats));
    Ok(())
}

/// Read input from file or stdin.
fn read_input(file: Option<&Path>) -> Result<String, IngestError> {
    match file {
        Some(path) if path.to_string_lossy() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(&path, "{\"id\":\"doc1\",\"text\":\"hello\"}\n").unwrap();

        let input = read_input(Some(&path)).unwrap();
        assert_eq!(parse_documents(&input).unwrap().len(), 1);
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_input(Some(&dir.path().join("missing.json"))),
            Err(IngestError::IoError(_))
        ));
    }
}
