use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;

use crate::domain::{ports::Embedder, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI embeddings through rig.
pub struct OpenAiEmbedder {
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }

    /// Fails when the API key is not set, so a misconfigured deployment
    /// stops at startup instead of on the first request.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        if std::env::var(API_KEY_ENV).is_err() {
            return Err(DomainError::config(format!("{API_KEY_ENV} is not set")));
        }
        Ok(Self::new(config.model.clone(), config.dimension))
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let client = openai::Client::from_env();
        let model = client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text)
            .map_err(|e| DomainError::embedding(e.to_string()))?
            .build()
            .await
            .map_err(|e| DomainError::embedding(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .map(|(_doc, emb)| {
                let vec_f32: Vec<f32> = emb.first().vec.into_iter().map(|x| x as f32).collect();
                Embedding::new(vec_f32)
            })
            .ok_or_else(|| DomainError::embedding("no embedding returned"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
