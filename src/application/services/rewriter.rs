use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::{ports::Generator, ConversationHistory, ConversationTurn, MAX_HISTORY_TURNS};

/// The `rewrite` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Transcripts at or below this many characters are used as-is.
    pub min_history_chars: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            min_history_chars: 80,
        }
    }
}

/// Turns a follow-up message into a standalone search query.
///
/// Summarizes the conversation first, then rewrites the message against that
/// summary. Any failure returns the original message unchanged.
pub struct QueryRewriter {
    generator: Arc<dyn Generator>,
    subject: String,
    options: RewriteOptions,
    max_history_turns: usize,
}

impl QueryRewriter {
    pub fn new(
        generator: Arc<dyn Generator>,
        subject: impl Into<String>,
        options: RewriteOptions,
    ) -> Self {
        Self {
            generator,
            subject: subject.into(),
            options,
            max_history_turns: MAX_HISTORY_TURNS,
        }
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    pub fn should_rewrite(&self, history: &ConversationHistory) -> bool {
        history.transcript(self.max_history_turns).chars().count() > self.options.min_history_chars
    }

    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn rewrite(&self, message: &str, history: &ConversationHistory) -> String {
        let turns = history.recent(self.max_history_turns);
        let Some(summary) = self
            .ask("summarize", message, self.summary_prompt(), turns)
            .await
        else {
            return message.to_string();
        };

        // the summary stands in for the conversation from here on
        match self
            .ask("rewrite", message, self.rewrite_prompt(message, &summary), &[])
            .await
        {
            Some(query) => {
                debug!(stage = "rewrite", original = message, rewritten = %query, "query rewritten");
                query
            }
            None => message.to_string(),
        }
    }

    fn summary_prompt(&self) -> String {
        format!(
            "Summarize the conversation so far in one or two sentences, focused on what was \
             discussed about {subject}.\n\n\
             Summary:",
            subject = self.subject,
        )
    }

    fn rewrite_prompt(&self, message: &str, summary: &str) -> String {
        format!(
            "Conversation summary: {summary}\n\n\
             Follow-up message: {message}\n\n\
             Rewrite the follow-up message as a single standalone search query about \
             {subject} that makes sense without the conversation. Resolve pronouns and \
             references using the summary. Reply with the query only.\n\n\
             Query:",
            subject = self.subject,
        )
    }

    /// One generator call; `None` on error or blank output.
    async fn ask(
        &self,
        stage: &'static str,
        message: &str,
        prompt: String,
        history: &[ConversationTurn],
    ) -> Option<String> {
        match self.generator.generate(&prompt, history).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!(stage, user_message = message, "empty output, using original message");
                None
            }
            Err(e) => {
                warn!(stage, user_message = message, error = %e, "failed, using original message");
                None
            }
        }
    }
}
