use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domain::{ports::Generator, Classification, ConversationHistory, MAX_HISTORY_TURNS};

/// Labels a message as context-specific, casual or generic.
///
/// Never fails: generator errors and unreadable answers both yield
/// `Classification::Casual`.
pub struct QueryClassifier {
    generator: Arc<dyn Generator>,
    subject: String,
    max_history_turns: usize,
}

impl QueryClassifier {
    pub fn new(generator: Arc<dyn Generator>, subject: impl Into<String>) -> Self {
        Self {
            generator,
            subject: subject.into(),
            max_history_turns: MAX_HISTORY_TURNS,
        }
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    /// Prior turns travel beside the prompt as generator history.
    pub fn prompt(&self, message: &str) -> String {
        let subject = &self.subject;
        format!(
            "Classify the current message, reading it in the light of the conversation so far.\n\n\
             Current message: {message}\n\n\
             Classify as:\n\
             - 'context-specific' if asking about {subject}, their work, skills, projects, or \
             using pronouns referring to them\n\
             - 'casual' if it's casual conversation (greetings, \"what's up\", small talk, \
             reactions like \"lol\")\n\
             - 'generic' if it's unrelated questions about other topics\n\n\
             Answer: "
        )
    }

    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn classify(&self, message: &str, history: &ConversationHistory) -> Classification {
        let prompt = self.prompt(message);
        let turns = history.recent(self.max_history_turns);

        match self.generator.generate(&prompt, turns).await {
            Ok(response) => {
                let classification = Classification::from_response(&response);
                info!(stage = "classify", %classification, "message classified");
                classification
            }
            Err(e) => {
                warn!(
                    stage = "classify",
                    user_message = message,
                    error = %e,
                    "classification failed, treating message as casual"
                );
                Classification::Casual
            }
        }
    }
}
