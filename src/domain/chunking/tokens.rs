use std::fmt;
use std::sync::Arc;

use tiktoken_rs::CoreBPE;
use tracing::warn;

use crate::domain::DomainError;

pub type TokenId = u32;

/// General-purpose encoding used when a model name is unknown to tiktoken.
pub const FALLBACK_ENCODING: &str = "cl100k_base";

/// Deterministic token arithmetic for one tokenizer model.
///
/// Cheap to clone; the BPE tables are shared.
#[derive(Clone)]
pub struct TokenCounter {
    model: String,
    fallback: bool,
    bpe: Arc<CoreBPE>,
}

impl TokenCounter {
    pub fn for_model(model: &str) -> Result<Self, DomainError> {
        match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => Ok(Self {
                model: model.to_string(),
                fallback: false,
                bpe: Arc::new(bpe),
            }),
            Err(e) => {
                warn!(
                    stage = "tokenize",
                    model,
                    error = %e,
                    "unknown tokenizer model, falling back to {FALLBACK_ENCODING}"
                );
                let bpe =
                    tiktoken_rs::cl100k_base().map_err(|e| DomainError::tokenizer(e.to_string()))?;
                Ok(Self {
                    model: model.to_string(),
                    fallback: true,
                    bpe: Arc::new(bpe),
                })
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the default encoding stands in for the requested model.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        self.bpe.encode_ordinary(text)
    }

    pub fn decode(&self, ids: &[TokenId]) -> Result<String, DomainError> {
        self.bpe
            .decode(ids.to_vec())
            .map_err(|e| DomainError::tokenizer(e.to_string()))
    }

    /// Text of the last `n` tokens of `text`.
    ///
    /// A cut can land inside a multi-byte character; leading tokens are
    /// dropped until the remainder decodes cleanly.
    pub fn tail(&self, text: &str, n: usize) -> String {
        let ids = self.encode(text);
        let start = ids.len().saturating_sub(n);

        (start..ids.len())
            .find_map(|from| self.decode(&ids[from..]).ok())
            .unwrap_or_default()
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("model", &self.model)
            .field("fallback", &self.fallback)
            .finish()
    }
}
