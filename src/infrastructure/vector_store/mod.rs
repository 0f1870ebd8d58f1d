mod in_memory;
mod qdrant;

pub use in_memory::InMemoryVectorIndex;
pub use qdrant::QdrantVectorIndex;

use std::sync::Arc;
use tracing::info;

use crate::domain::{ports::VectorIndex, Result};
use crate::infrastructure::config::{AppConfig, VectorStoreKind};

/// Opens the configured store under `retrieval.index_name` / `retrieval.field_name`.
pub async fn build_vector_index(config: &AppConfig) -> Result<Arc<dyn VectorIndex>> {
    let index_name = &config.retrieval.index_name;
    let field_name = &config.retrieval.field_name;

    let index: Arc<dyn VectorIndex> = match config.vector_store.kind {
        VectorStoreKind::Qdrant => Arc::new(
            QdrantVectorIndex::new(
                &config.vector_store.url,
                index_name,
                field_name,
                config.embedding.dimension,
            )
            .await?,
        ),
        VectorStoreKind::Memory => Arc::new(InMemoryVectorIndex::new(index_name, field_name)),
    };

    info!(kind = %config.vector_store.kind, index = %index_name, "vector index ready");
    Ok(index)
}
