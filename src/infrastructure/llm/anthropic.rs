use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic;

use crate::domain::{
    ports::Generator, render_transcript, ConversationTurn, DomainError, MAX_HISTORY_TURNS,
};

const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const MAX_TOKENS: u64 = 1024;

/// Single-prompt generator: prior turns are folded into the prompt text.
pub struct AnthropicLlm {
    model: String,
}

impl AnthropicLlm {
    pub fn new(model: impl Into<String>) -> Result<Self, DomainError> {
        if std::env::var(API_KEY_ENV).is_err() {
            return Err(DomainError::config(format!("{API_KEY_ENV} is not set")));
        }
        Ok(Self {
            model: model.into(),
        })
    }

    fn build_prompt(prompt: &str, history: &[ConversationTurn]) -> String {
        if history.is_empty() {
            return prompt.to_string();
        }

        let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
        format!(
            "Previous conversation:\n{}\n\n{}",
            render_transcript(&history[start..]),
            prompt
        )
    }
}

#[async_trait]
impl Generator for AnthropicLlm {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, DomainError> {
        let client = anthropic::Client::from_env();
        let agent = client.agent(&self.model).max_tokens(MAX_TOKENS).build();

        agent
            .prompt(Self::build_prompt(prompt, history))
            .await
            .map_err(|e| DomainError::generation(e.to_string()))
    }
}
