use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{
    ports::{Embedder, SearchRequest, VectorIndex},
    ChunkFilter, DomainError, Result, ScoredChunk,
};

/// The `retrieval` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalOptions {
    pub top_k: usize,
    /// Candidate pool size as a multiple of `top_k`.
    pub candidate_multiplier: usize,
    pub min_score: Option<f32>,
    pub index_name: String,
    pub field_name: String,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            candidate_multiplier: 16,
            min_score: None,
            index_name: "profile_chunks".to_string(),
            field_name: "embedding".to_string(),
        }
    }
}

impl RetrievalOptions {
    pub fn num_candidates(&self, k: usize) -> usize {
        k.saturating_mul(self.candidate_multiplier).max(k)
    }
}

pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    options: RetrievalOptions,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            embedder,
            index,
            options,
        }
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        self.retrieve_top_k(query, self.options.top_k, ChunkFilter::default())
            .await
    }

    /// Embeds `query` and returns at most `k` chunks by descending score.
    ///
    /// An embedder error or an empty vector fails with
    /// `DomainError::Embedding`; index failures come back as they are.
    #[instrument(skip(self, filter))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        k: usize,
        filter: ChunkFilter,
    ) -> Result<Vec<ScoredChunk>> {
        let embedding = match self.embedder.embed(query).await {
            Ok(e) if !e.is_empty() => e,
            Ok(_) => return Err(DomainError::embedding("embedder returned an empty vector")),
            Err(DomainError::Embedding(msg)) => return Err(DomainError::Embedding(msg)),
            Err(e) => return Err(DomainError::embedding(e.to_string())),
        };

        let request = SearchRequest {
            index_name: self.options.index_name.clone(),
            field_name: self.options.field_name.clone(),
            query: embedding,
            num_candidates: self.options.num_candidates(k),
            limit: k,
            filter,
        };

        let mut results = self.index.search(&request).await?;
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(min_score) = self.options.min_score {
            results.retain(|r| r.score >= min_score);
        }
        results.truncate(k);

        debug!(
            results = results.len(),
            num_candidates = request.num_candidates,
            "retrieval finished"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{EmbedBehavior, FakeEmbedder, FakeIndex};
    use crate::domain::{Chunk, SourceType};

    fn scored(text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(SourceType::Resume, text, 0),
            score,
        }
    }

    #[tokio::test]
    async fn test_results_truncated_and_ordered() {
        let index = Arc::new(FakeIndex::with_results(vec![
            scored("b", 0.5),
            scored("a", 0.9),
            scored("d", 0.1),
            scored("c", 0.3),
        ]));
        let retriever = Retriever::new(
            Arc::new(FakeEmbedder::constant(vec![1.0, 0.0])),
            index.clone(),
            RetrievalOptions::default(),
        );

        let results = retriever.retrieve("skills").await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);

        let request = &index.requests()[0];
        assert_eq!(request.limit, 3);
        assert_eq!(request.num_candidates, 48);
        assert_eq!(request.field_name, "embedding");
    }

    #[test]
    fn test_candidate_pool_never_below_k() {
        let options = RetrievalOptions {
            candidate_multiplier: 0,
            ..Default::default()
        };
        assert_eq!(options.num_candidates(5), 5);
    }

    #[tokio::test]
    async fn test_min_score_drops_weak_matches() {
        let retriever = Retriever::new(
            Arc::new(FakeEmbedder::constant(vec![1.0])),
            Arc::new(FakeIndex::with_results(vec![
                scored("strong", 0.8),
                scored("weak", 0.2),
            ])),
            RetrievalOptions {
                min_score: Some(0.5),
                ..Default::default()
            },
        );

        let results = retriever.retrieve("q").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "strong");
    }

    #[tokio::test]
    async fn test_empty_embedding_is_an_embedding_error() {
        let index = Arc::new(FakeIndex::default());
        let retriever = Retriever::new(
            Arc::new(FakeEmbedder::new(EmbedBehavior::Empty)),
            index.clone(),
            RetrievalOptions::default(),
        );

        let err = retriever.retrieve("q").await.unwrap_err();
        assert!(matches!(err, DomainError::Embedding(_)));
        assert!(index.requests().is_empty());
    }

    #[tokio::test]
    async fn test_index_error_propagates() {
        let retriever = Retriever::new(
            Arc::new(FakeEmbedder::constant(vec![1.0])),
            Arc::new(FakeIndex::failing()),
            RetrievalOptions::default(),
        );

        let err = retriever.retrieve("q").await.unwrap_err();
        assert!(matches!(err, DomainError::Index(_)));
    }
}
