use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domain::{
    chunking::Chunker,
    ports::{Embedder, VectorIndex},
    Chunk, DomainError, Embedding, ProfileBundle, ProfileDocument, Result, SourceType,
};

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source_type: SourceType,
    pub chunks: usize,
    pub stored: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub strategy: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
}

impl IngestionReport {
    pub fn stored(&self) -> usize {
        self.sources.iter().map(|s| s.stored).sum()
    }
}

/// Chunks, embeds and stores profile documents.
///
/// Each source is replaced wholesale: its previous chunks are deleted only
/// after the new ones have been embedded.
pub struct IngestionService {
    chunker: Box<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    embed_delay: Duration,
}

impl IngestionService {
    pub fn new(
        chunker: Box<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
            embed_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive embedding calls.
    pub fn with_embed_delay(mut self, delay: Duration) -> Self {
        self.embed_delay = delay;
        self
    }

    #[instrument(skip(self, bundle), fields(strategy = %self.chunker.strategy()))]
    pub async fn ingest_bundle(&self, bundle: &ProfileBundle) -> Result<IngestionReport> {
        let started_at = Utc::now();
        let mut sources = Vec::new();

        for document in bundle.documents() {
            sources.push(self.ingest_document(&document).await?);
        }

        let report = IngestionReport {
            strategy: self.chunker.strategy().to_string(),
            started_at,
            finished_at: Utc::now(),
            sources,
        };
        info!(
            stored = report.stored(),
            sources = report.sources.len(),
            "ingestion finished"
        );
        Ok(report)
    }

    #[instrument(skip(self, document), fields(source_type = %document.source_type()))]
    pub async fn ingest_document(&self, document: &ProfileDocument) -> Result<SourceReport> {
        let source_type = document.source_type();
        let chunks = self.chunker.chunk(document);
        let total = chunks.len();

        let embedded = self.embed_all(chunks).await;
        if total > 0 && embedded.is_empty() {
            return Err(DomainError::embedding(format!(
                "no {source_type} chunk could be embedded"
            )));
        }

        self.index.delete_by_source(source_type).await?;
        for (chunk, embedding) in &embedded {
            self.index.upsert(chunk, embedding).await?;
        }

        let report = SourceReport {
            source_type,
            chunks: total,
            stored: embedded.len(),
            skipped: total - embedded.len(),
        };
        info!(
            chunks = report.chunks,
            stored = report.stored,
            skipped = report.skipped,
            "source ingested"
        );
        Ok(report)
    }

    /// Embeds chunks one at a time; failures are logged and dropped.
    async fn embed_all(&self, chunks: Vec<Chunk>) -> Vec<(Chunk, Embedding)> {
        stream::iter(chunks.into_iter().enumerate())
            .then(|(i, chunk)| async move {
                if i > 0 && !self.embed_delay.is_zero() {
                    tokio::time::sleep(self.embed_delay).await;
                }
                match self.embedder.embed(&chunk.text).await {
                    Ok(embedding) if embedding.is_empty() => {
                        warn!(
                            stage = "embed",
                            chunk_index = chunk.chunk_index,
                            "empty embedding, skipping chunk"
                        );
                        None
                    }
                    Ok(embedding) if embedding.dimension() != self.embedder.dimension() => {
                        warn!(
                            stage = "embed",
                            chunk_index = chunk.chunk_index,
                            got = embedding.dimension(),
                            expected = self.embedder.dimension(),
                            "embedding dimension mismatch, skipping chunk"
                        );
                        None
                    }
                    Ok(embedding) => Some((chunk, embedding)),
                    Err(e) => {
                        warn!(
                            stage = "embed",
                            chunk_index = chunk.chunk_index,
                            error = %e,
                            "embedding failed, skipping chunk"
                        );
                        None
                    }
                }
            })
            .filter_map(|embedded| async move { embedded })
            .collect()
            .await
    }
}
