//! Qdrant vector store backend implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use tracing::debug;
use uuid::Uuid;

use super::VectorStore;
use crate::error::VectorStoreError;
use crate::models::{IndexMatch, IndexRecord, IndexStats, Metadata, VectorStoreConfig};

/// Payload key holding the caller's document id; Qdrant point ids must be UUIDs or integers.
const DOC_ID_KEY: &str = "doc_id";

/// Qdrant vector store backend.
pub struct QdrantBackend {
    client: Qdrant,
    collection: String,
    embedding_dim: u64,
}

impl QdrantBackend {
    /// Create a new Qdrant backend from configuration with custom embedding dimension.
    pub fn new(config: &VectorStoreConfig, embedding_dim: u64) -> Result<Self, VectorStoreError> {
        let url = config.url.as_deref().ok_or_else(|| {
            VectorStoreError::ConnectionError("vector index URL is not configured".to_string())
        })?;
        let collection = config.collection.clone().ok_or_else(|| {
            VectorStoreError::CollectionError("collection name is not configured".to_string())
        })?;

        let mut builder =
            Qdrant::from_url(url).timeout(Duration::from_secs(config.timeout_secs));

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            collection,
            embedding_dim,
        })
    }
}

#[async_trait]
impl VectorStore for QdrantBackend {
    async fn describe_stats(&self) -> Result<IndexStats, VectorStoreError> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(IndexStats {
            points_count: info.result.map_or(0, |r| r.points_count.unwrap_or(0)),
        })
    }

    async fn ensure_collection(&self) -> Result<(), VectorStoreError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorStoreError::CollectionError(e.to_string()))?;
        if exists {
            return Ok(());
        }

        let create_collection = CreateCollectionBuilder::new(&self.collection).vectors_config(
            VectorParamsBuilder::new(self.embedding_dim, Distance::Cosine),
        );

        self.client
            .create_collection(create_collection)
            .await
            .map_err(|e| VectorStoreError::CollectionError(e.to_string()))?;

        debug!(collection = %self.collection, dim = self.embedding_dim, "Created collection");
        Ok(())
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let id = point_id(&record.id);
                PointStruct::new(id, record.vector, build_payload(record.id, record.metadata))
            })
            .collect();

        let upsert = UpsertPointsBuilder::new(&self.collection, points).wait(true);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> Result<Vec<IndexMatch>, VectorStoreError> {
        let search = SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);

        let results = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::SearchError(e.to_string()))?;

        Ok(results.result.into_iter().map(match_from_point).collect())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

/// Deterministic point id for a document id.
fn point_id(doc_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, doc_id.as_bytes()).to_string()
}

fn build_payload(doc_id: String, metadata: Metadata) -> HashMap<String, Value> {
    let mut payload: HashMap<String, Value> = metadata
        .into_iter()
        .map(|(key, value)| (key, value.into()))
        .collect();
    payload.insert(DOC_ID_KEY.to_string(), doc_id.into());
    payload
}

fn payload_string(value: &Value) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn match_from_point(point: ScoredPoint) -> IndexMatch {
    let mut metadata = Metadata::new();
    let mut doc_id = None;

    for (key, value) in &point.payload {
        let Some(text) = payload_string(value) else {
            continue;
        };
        if key == DOC_ID_KEY {
            doc_id = Some(text);
        } else {
            metadata.insert(key.clone(), text);
        }
    }

    let id = doc_id
        .filter(|id| !id.is_empty())
        .or_else(|| point.id.as_ref().and_then(raw_point_id));

    IndexMatch {
        id,
        score: point.score,
        metadata,
    }
}

fn raw_point_id(id: &PointId) -> Option<String> {
    match &id.point_id_options {
        Some(PointIdOptions::Uuid(uuid)) => Some(uuid.clone()),
        Some(PointIdOptions::Num(num)) => Some(num.to_string()),
        None => None,
    }
}
