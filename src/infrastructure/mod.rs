pub mod bundle;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod logging;
pub mod vector_store;

pub use bundle::load_bundle;
pub use config::{
    AppConfig, EmbeddingConfig, IngestConfig, LlmConfig, LlmProvider, ServerConfig,
    VectorStoreConfig, VectorStoreKind,
};
pub use embedding::OpenAiEmbedder;
pub use llm::{build_generator, AnthropicLlm, GeminiLlm};
pub use logging::init_tracing;
pub use vector_store::{build_vector_index, InMemoryVectorIndex, QdrantVectorIndex};
