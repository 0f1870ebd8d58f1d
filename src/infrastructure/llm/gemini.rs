use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::{Chat, Message};
use rig::providers::gemini;

use crate::domain::{ports::Generator, ConversationTurn, DomainError, Role, MAX_HISTORY_TURNS};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Message-array generator: prior turns travel as chat history.
pub struct GeminiLlm {
    model: String,
}

impl GeminiLlm {
    pub fn new(model: impl Into<String>) -> Result<Self, DomainError> {
        if std::env::var(API_KEY_ENV).is_err() {
            return Err(DomainError::config(format!("{API_KEY_ENV} is not set")));
        }
        Ok(Self {
            model: model.into(),
        })
    }

    fn to_messages(history: &[ConversationTurn]) -> Vec<Message> {
        let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
        history[start..]
            .iter()
            .map(|turn| match turn.role {
                Role::User => Message::user(turn.content.clone()),
                Role::Assistant => Message::assistant(turn.content.clone()),
            })
            .collect()
    }
}

#[async_trait]
impl Generator for GeminiLlm {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, DomainError> {
        let client = gemini::Client::from_env();
        let agent = client.agent(&self.model).build();

        agent
            .chat(prompt, Self::to_messages(history))
            .await
            .map_err(|e| DomainError::generation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_becomes_bounded_messages() {
        let mut history = vec![ConversationTurn::assistant("oldest")];
        history.extend((0..10).map(|i| ConversationTurn::user(format!("turn {i}"))));
        history.push(ConversationTurn::assistant("latest"));

        let messages = GeminiLlm::to_messages(&history);
        assert_eq!(messages.len(), MAX_HISTORY_TURNS);
        assert!(matches!(messages[0], Message::User { .. }));
        assert!(matches!(messages[9], Message::Assistant { .. }));
    }

    #[test]
    fn test_empty_history() {
        assert!(GeminiLlm::to_messages(&[]).is_empty());
    }
}
