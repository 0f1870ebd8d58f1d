use crate::domain::{errors::DomainError, Chunk, ChunkFilter, Embedding, ScoredChunk, SourceType};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub index_name: String,
    pub field_name: String,
    pub query: Embedding,
    /// Size of the approximate candidate pool, never below `limit`.
    pub num_candidates: usize,
    pub limit: usize,
    pub filter: ChunkFilter,
}

/// Similarity search over ingested chunks.
///
/// Results come back ordered by descending score. An unknown index or
/// vector field is reported as `DomainError::Index`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, chunk: &Chunk, embedding: &Embedding) -> Result<(), DomainError>;
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredChunk>, DomainError>;
    async fn delete_by_source(&self, source_type: SourceType) -> Result<(), DomainError>;
}
