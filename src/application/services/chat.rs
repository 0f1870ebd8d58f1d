use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::classifier::QueryClassifier;
use super::prompts::{format_response, PromptAssembler};
use super::retriever::Retriever;
use super::rewriter::QueryRewriter;
use crate::domain::{
    ports::Generator, Classification, ConversationHistory, DomainError, Result, ScoredChunk,
};

#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub response: String,
    pub classification: Classification,
    /// Query sent to the retriever, after any rewrite.
    pub search_query: Option<String>,
    pub sources: Vec<ScoredChunk>,
}

/// Classify, rewrite, retrieve, assemble, generate, format.
///
/// Stages run strictly in sequence. Only an embedding failure or a failed
/// final generation aborts the request; every other stage degrades.
pub struct ChatService {
    classifier: QueryClassifier,
    rewriter: QueryRewriter,
    retriever: Retriever,
    assembler: PromptAssembler,
    generator: Arc<dyn Generator>,
}

impl ChatService {
    pub fn new(
        classifier: QueryClassifier,
        rewriter: QueryRewriter,
        retriever: Retriever,
        assembler: PromptAssembler,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            classifier,
            rewriter,
            retriever,
            assembler,
            generator,
        }
    }

    #[instrument(skip_all, fields(user_message = %message))]
    pub async fn answer(&self, message: &str, raw_history: &str) -> Result<ChatAnswer> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DomainError::validation("no message provided"));
        }

        let history = ConversationHistory::parse(raw_history);
        let classification = self.classifier.classify(message, &history).await;

        let (search_query, sources) = if classification == Classification::ContextSpecific {
            let query = if self.rewriter.should_rewrite(&history) {
                self.rewriter.rewrite(message, &history).await
            } else {
                message.to_string()
            };
            let sources = self.retrieve(message, &query).await?;
            (Some(query), sources)
        } else {
            (None, Vec::new())
        };

        let prompt = self
            .assembler
            .assemble(classification, message, &history, &sources);

        let raw = self
            .generator
            .generate(&prompt.text, prompt.history)
            .await
            .map_err(|e| {
                error!(stage = "generate", user_message = message, error = %e, "answer generation failed");
                match e {
                    DomainError::Generation(_) | DomainError::Timeout(_) => e,
                    other => DomainError::generation(other.to_string()),
                }
            })?;

        info!(
            %classification,
            sources = sources.len(),
            "answer generated"
        );

        Ok(ChatAnswer {
            response: format_response(&raw),
            classification,
            search_query,
            sources,
        })
    }

    /// `answer` bounded by a caller deadline covering the whole chain.
    pub async fn answer_within(
        &self,
        message: &str,
        raw_history: &str,
        deadline: Duration,
    ) -> Result<ChatAnswer> {
        tokio::time::timeout(deadline, self.answer(message, raw_history))
            .await
            .map_err(|_| {
                warn!(user_message = message, ?deadline, "chat request timed out");
                DomainError::timeout(format!("no answer within {deadline:?}"))
            })?
    }

    /// Embedding failures abort; index failures degrade to an empty result.
    async fn retrieve(&self, message: &str, query: &str) -> Result<Vec<ScoredChunk>> {
        match self.retriever.retrieve(query).await {
            Ok(sources) if sources.is_empty() => {
                info!(stage = "retrieve", user_message = message, "no matching chunks");
                Ok(sources)
            }
            Ok(sources) => Ok(sources),
            Err(e @ DomainError::Embedding(_)) => {
                error!(stage = "embed", user_message = message, error = %e, "query embedding failed");
                Err(e)
            }
            Err(e) => {
                warn!(
                    stage = "retrieve",
                    user_message = message,
                    error = %e,
                    "vector index unavailable, answering without context"
                );
                Ok(Vec::new())
            }
        }
    }
}
