use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported chunking strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsupported_strategy(msg: impl Into<String>) -> Self {
        Self::UnsupportedStrategy(msg.into())
    }

    pub fn tokenizer(msg: impl Into<String>) -> Self {
        Self::Tokenizer(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Text shown to the end user when a request has to be aborted.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "Sorry, I encountered an issue processing your request.",
            Self::Generation(_) | Self::Timeout(_) => {
                "Sorry, I encountered an issue generating a response. Please try again."
            }
            Self::Validation(_) => "Error: No message provided",
            _ => "Sorry, something went wrong on our side. Please try again later.",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_fatal_errors() {
        assert!(DomainError::embedding("empty vector")
            .user_message()
            .contains("processing your request"));
        assert!(DomainError::generation("429")
            .user_message()
            .contains("generating a response"));
    }
}
