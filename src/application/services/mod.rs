mod chat;
mod classifier;
mod ingestion;
mod prompts;
mod retriever;
mod rewriter;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::{ChatAnswer, ChatService};
pub use classifier::QueryClassifier;
pub use ingestion::{IngestionReport, IngestionService, SourceReport};
pub use prompts::{format_response, AssembledPrompt, Persona, PromptAssembler};
pub use retriever::{RetrievalOptions, Retriever};
pub use rewriter::{QueryRewriter, RewriteOptions};
