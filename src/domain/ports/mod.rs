mod embedding;
mod llm;
mod vector_store;

pub use embedding::Embedder;
pub use llm::Generator;
pub use vector_store::{SearchRequest, VectorIndex};
