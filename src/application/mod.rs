//! Application layer - query pipeline and ingestion use cases.
//!
//! Services depend on domain ports (traits) rather than concrete
//! implementations, so every external call can be replaced by a fake.

pub mod services;

pub use services::{
    format_response, ChatAnswer, ChatService, IngestionReport, IngestionService, Persona,
    PromptAssembler, QueryClassifier, QueryRewriter, RetrievalOptions, Retriever, RewriteOptions,
    SourceReport,
};
