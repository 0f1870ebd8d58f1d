use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{
    ports::{SearchRequest, VectorIndex},
    Chunk, DomainError, Embedding, ScoredChunk, SourceType,
};

/// Exact cosine search over chunks held in memory.
///
/// Only answers for its own index and vector field names, like a real
/// vector search index would.
pub struct InMemoryVectorIndex {
    index_name: String,
    field_name: String,
    chunks: RwLock<Vec<(Chunk, Embedding)>>,
}

impl InMemoryVectorIndex {
    pub fn new(index_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            field_name: field_name.into(),
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, chunk: &Chunk, embedding: &Embedding) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(c, _)| c.id != chunk.id);
        store.push((chunk.clone(), embedding.clone()));
        Ok(())
    }

    /// Ranks everything, keeps the `num_candidates` best, applies the
    /// filter, then cuts to `limit`.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredChunk>, DomainError> {
        if request.index_name != self.index_name {
            return Err(DomainError::index(format!(
                "unknown index: {}",
                request.index_name
            )));
        }
        if request.field_name != self.field_name {
            return Err(DomainError::index(format!(
                "unknown vector field: {}",
                request.field_name
            )));
        }

        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<ScoredChunk> = store
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: request.query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(results
            .into_iter()
            .take(request.num_candidates.max(request.limit))
            .filter(|r| request.filter.matches(&r.chunk))
            .take(request.limit)
            .collect())
    }

    async fn delete_by_source(&self, source_type: SourceType) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(chunk, _)| chunk.source_type != source_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChunkFilter;

    fn request(query: Vec<f32>, limit: usize) -> SearchRequest {
        SearchRequest {
            index_name: "profile_chunks".into(),
            field_name: "embedding".into(),
            query: Embedding::new(query),
            num_candidates: limit * 10,
            limit,
            filter: ChunkFilter::default(),
        }
    }

    async fn seeded() -> InMemoryVectorIndex {
        let index = InMemoryVectorIndex::new("profile_chunks", "embedding");
        let rows = [
            (SourceType::Resume, "skills", vec![1.0, 0.0, 0.0]),
            (SourceType::Linkedin, "education", vec![0.0, 1.0, 0.0]),
            (SourceType::Github, "repositories", vec![0.7, 0.7, 0.0]),
        ];
        for (i, (source, section, vector)) in rows.into_iter().enumerate() {
            let chunk = Chunk::new(source, format!("chunk {i}"), i).with_section(section);
            index.upsert(&chunk, &Embedding::new(vector)).await.unwrap();
        }
        index
    }

    #[tokio::test]
    async fn test_upsert_and_search() {
        let index = seeded().await;

        let results = index.search(&request(vec![1.0, 0.0, 0.0], 2)).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].chunk.section(), "skills");
        assert_eq!(results[1].chunk.section(), "repositories");
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let index = InMemoryVectorIndex::new("profile_chunks", "embedding");
        let chunk = Chunk::new(SourceType::Resume, "text", 0);

        index.upsert(&chunk, &Embedding::new(vec![1.0])).await.unwrap();
        index.upsert(&chunk, &Embedding::new(vec![0.5])).await.unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_applies_after_candidates() {
        let index = seeded().await;

        let mut req = request(vec![1.0, 0.0, 0.0], 3);
        req.filter.source_type = Some(SourceType::Linkedin);
        let results = index.search(&req).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.source_type, SourceType::Linkedin);

        req.num_candidates = 2;
        req.limit = 2;
        assert!(index.search(&req).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_index_or_field() {
        let index = seeded().await;

        let mut req = request(vec![1.0, 0.0, 0.0], 1);
        req.index_name = "vector_index_3".into();
        assert!(matches!(
            index.search(&req).await,
            Err(DomainError::Index(_))
        ));

        let mut req = request(vec![1.0, 0.0, 0.0], 1);
        req.field_name = "vector".into();
        assert!(matches!(
            index.search(&req).await,
            Err(DomainError::Index(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_source() {
        let index = seeded().await;

        index.delete_by_source(SourceType::Github).await.unwrap();

        let results = index.search(&request(vec![1.0, 1.0, 0.0], 10)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.chunk.source_type != SourceType::Github));
    }
}
