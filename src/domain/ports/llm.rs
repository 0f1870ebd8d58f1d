use crate::domain::{errors::DomainError, ConversationTurn};
use async_trait::async_trait;

/// Prompt (plus optional prior turns) to completion text.
///
/// History is always handed over as structured turns; each implementation
/// adapts it to its vendor's shape. Transport, auth and rate-limit failures
/// are reported as `DomainError::Generation`.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, DomainError>;
}
