use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    ScoredPoint, SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder, VectorsConfigBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::domain::{
    ports::{SearchRequest, VectorIndex},
    Chunk, ChunkFilter, DomainError, Embedding, ScoredChunk, SourceType,
};

/// Chunks stored as Qdrant points.
///
/// The collection plays the role of the index name and the named vector
/// the role of the embedding field. The payload is the chunk's storage
/// shape, so filters address `source_type` and `metadata.section`.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    vector_name: String,
    dimension: usize,
}

impl QdrantVectorIndex {
    pub async fn new(
        url: &str,
        collection: &str,
        vector_name: &str,
        dimension: usize,
    ) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::index(e.to_string()))?;

        let index = Self {
            client,
            collection: collection.to_string(),
            vector_name: vector_name.to_string(),
            dimension,
        };

        index.ensure_collection().await?;

        Ok(index)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::index(e.to_string()))?;

        if !exists {
            let mut vectors = VectorsConfigBuilder::default();
            vectors.add_named_vector_params(
                &self.vector_name,
                VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
            );

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(vectors),
                )
                .await
                .map_err(|e| DomainError::index(e.to_string()))?;
            info!(collection = %self.collection, dimension = self.dimension, "collection created");
        }

        Ok(())
    }

    fn check_names(&self, request: &SearchRequest) -> Result<(), DomainError> {
        if request.index_name != self.collection {
            return Err(DomainError::index(format!(
                "unknown index: {}",
                request.index_name
            )));
        }
        if request.field_name != self.vector_name {
            return Err(DomainError::index(format!(
                "unknown vector field: {}",
                request.field_name
            )));
        }
        Ok(())
    }
}

fn to_filter(filter: &ChunkFilter) -> Option<Filter> {
    if filter.is_empty() {
        return None;
    }

    let mut conditions = Vec::new();
    if let Some(source_type) = filter.source_type {
        conditions.push(Condition::matches("source_type", source_type.to_string()));
    }
    if let Some(section) = &filter.section {
        conditions.push(Condition::matches("metadata.section", section.clone()));
    }

    Some(Filter::must(conditions))
}

fn to_scored_chunk(point: ScoredPoint) -> Option<ScoredChunk> {
    let payload = serde_json::Value::from(Payload::from(point.payload));
    match serde_json::from_value::<Chunk>(payload) {
        Ok(chunk) => Some(ScoredChunk {
            chunk,
            score: point.score,
        }),
        Err(e) => {
            warn!(error = %e, "skipping point with unreadable payload");
            None
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, chunk: &Chunk, embedding: &Embedding) -> Result<(), DomainError> {
        let payload: Payload = serde_json::to_value(chunk)
            .map_err(|e| DomainError::internal(e.to_string()))?
            .try_into()
            .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let vectors: HashMap<String, Vec<f32>> =
            HashMap::from([(self.vector_name.clone(), embedding.as_slice().to_vec())]);
        let point = PointStruct::new(chunk.id.to_string(), vectors, payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| DomainError::index(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredChunk>, DomainError> {
        self.check_names(request)?;

        let mut search = SearchPointsBuilder::new(
            &self.collection,
            request.query.as_slice().to_vec(),
            request.limit as u64,
        )
        .vector_name(&self.vector_name)
        .params(SearchParamsBuilder::default().hnsw_ef(request.num_candidates as u64))
        .with_payload(true);

        if let Some(filter) = to_filter(&request.filter) {
            search = search.filter(filter);
        }

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| DomainError::index(e.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(to_scored_chunk)
            .collect())
    }

    async fn delete_by_source(&self, source_type: SourceType) -> Result<(), DomainError> {
        let filter = Filter::must([Condition::matches(
            "source_type",
            source_type.to_string(),
        )]);

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(filter)
                    .wait(true),
            )
            .await
            .map_err(|e| DomainError::index(e.to_string()))?;

        Ok(())
    }
}
