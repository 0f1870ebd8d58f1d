//! Turning profile documents into retrievable chunks.

mod sections;
mod sentences;
mod sliding_window;
mod structured;
mod tokens;

pub use sections::SectionTagger;
pub use sentences::split_sentences;
pub use sliding_window::{SlidingWindowChunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP_SIZE};
pub use structured::StructuredChunker;
pub use tokens::{TokenCounter, TokenId, FALLBACK_ENCODING};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{Chunk, DomainError, ProfileDocument, Result};

pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    #[value(name = "sliding_window")]
    SlidingWindow,
    Structured,
    Semantic,
    Hierarchical,
}

impl ChunkingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlidingWindow => "sliding_window",
            Self::Structured => "structured",
            Self::Semantic => "semantic",
            Self::Hierarchical => "hierarchical",
        }
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkingStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sliding_window" => Ok(Self::SlidingWindow),
            "structured" => Ok(Self::Structured),
            "semantic" => Ok(Self::Semantic),
            "hierarchical" => Ok(Self::Hierarchical),
            other => Err(DomainError::unsupported_strategy(other)),
        }
    }
}

pub trait Chunker: Send + Sync {
    fn strategy(&self) -> ChunkingStrategy;

    fn chunk(&self, document: &ProfileDocument) -> Vec<Chunk>;
}

/// The `chunking` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    pub strategy: ChunkingStrategy,
    pub chunk_size: usize,
    pub overlap_size: usize,
    pub model_name: String,
    pub include_summaries: bool,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::SlidingWindow,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            model_name: DEFAULT_TOKENIZER_MODEL.to_string(),
            include_summaries: true,
        }
    }
}

/// Builds the chunker for a configured strategy.
///
/// Strategies without an implementation fail here instead of at first use.
pub fn build_chunker(options: &ChunkingOptions) -> Result<Box<dyn Chunker>> {
    match options.strategy {
        ChunkingStrategy::SlidingWindow => {
            let counter = TokenCounter::for_model(&options.model_name)?;
            Ok(Box::new(SlidingWindowChunker::new(
                counter,
                options.chunk_size,
                options.overlap_size,
            )))
        }
        ChunkingStrategy::Structured => {
            let counter = TokenCounter::for_model(&options.model_name)?;
            Ok(Box::new(StructuredChunker::new(
                counter,
                options.include_summaries,
            )))
        }
        unsupported @ (ChunkingStrategy::Semantic | ChunkingStrategy::Hierarchical) => Err(
            DomainError::unsupported_strategy(unsupported.as_str()),
        ),
    }
}
