//! Batch ingestion of `{ id, text }` documents into the vector index.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::error::IngestError;
use crate::models::Document;
use crate::services::embedding::EmbeddingProvider;
use crate::services::vector_store::VectorStore;

/// Documents embedded per model invocation.
pub const INGEST_BATCH_SIZE: usize = 16;

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub documents_indexed: u64,
    pub collection: String,
    pub duration_ms: u64,
}

/// Parse documents from a JSON array or JSONL (one object per line).
///
/// Every document must have a non-empty `id` and `text`.
pub fn parse_documents(input: &str) -> Result<Vec<Document>, IngestError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let documents: Vec<Document> = if input.starts_with('[') {
        serde_json::from_str(input)
            .map_err(|source| IngestError::JsonParseError { line: 1, source })?
    } else {
        let mut documents = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let doc = serde_json::from_str(line)
                .map_err(|source| IngestError::JsonParseError { line: i + 1, source })?;
            documents.push(doc);
        }
        documents
    };

    for (i, doc) in documents.iter().enumerate() {
        if doc.id.trim().is_empty() {
            return Err(IngestError::InvalidDocument(format!(
                "document {} has an empty id",
                i + 1
            )));
        }
        if doc.text.trim().is_empty() {
            return Err(IngestError::InvalidDocument(format!(
                "document '{}' has empty text",
                doc.id
            )));
        }
    }

    Ok(documents)
}

/// Embed and upsert `documents`, calling `on_progress` with the number stored per batch.
pub async fn ingest_documents<F>(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorStore,
    documents: Vec<Document>,
    mut on_progress: F,
) -> Result<IngestStats, IngestError>
where
    F: FnMut(usize),
{
    let start = Instant::now();
    let mut stats = IngestStats {
        collection: index.collection().to_string(),
        ..Default::default()
    };

    if documents.is_empty() {
        return Ok(stats);
    }

    index.ensure_collection().await?;

    for batch in documents.chunks(INGEST_BATCH_SIZE) {
        let texts = batch.iter().map(|d| d.text.clone()).collect();
        let vectors = embedder.embed_batch(texts).await?;

        let records = batch
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(doc, vector)| doc.into_record(vector))
            .collect::<Vec<_>>();
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        index.upsert(records).await?;

        for id in &ids {
            info!(id = %id, collection = %stats.collection, "Upserted document");
        }
        stats.documents_indexed += ids.len() as u64;
        on_progress(ids.len());
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok(stats)
}
