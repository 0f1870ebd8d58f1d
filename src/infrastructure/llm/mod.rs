mod anthropic;
mod gemini;

pub use anthropic::AnthropicLlm;
pub use gemini::GeminiLlm;

use std::sync::Arc;

use crate::domain::{ports::Generator, Result};
use crate::infrastructure::config::{LlmConfig, LlmProvider};

/// Picks the generator implementation for the configured provider.
pub fn build_generator(config: &LlmConfig) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiLlm::new(&config.model)?),
        LlmProvider::Anthropic => Arc::new(AnthropicLlm::new(&config.model)?),
    };
    Ok(generator)
}
