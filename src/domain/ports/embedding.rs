use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Text to fixed-length vector.
///
/// Implementations may report failure either as `Err` or as an empty
/// embedding; callers treat both the same way.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    fn dimension(&self) -> usize;
}
