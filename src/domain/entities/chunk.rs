use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::DomainError;

pub const DEFAULT_SECTION: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Resume,
    Linkedin,
    Github,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Linkedin => "linkedin",
            Self::Github => "github",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(Self::Resume),
            "linkedin" => Ok(Self::Linkedin),
            "github" => Ok(Self::Github),
            other => Err(DomainError::validation(format!("unknown source type: {other}"))),
        }
    }
}

/// A retrievable unit of profile text.
///
/// The serialized form is the storage shape: `chunk_text`, `source_type`,
/// `chunk_index`, `token_count` and `metadata.section` are always present,
/// `item_index` and `content` only for structured chunks. The embedding is
/// stored next to it by the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    #[serde(rename = "chunk_text")]
    pub text: String,
    pub source_type: SourceType,
    pub chunk_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    pub token_count: usize,
    pub metadata: ChunkMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

impl Chunk {
    pub fn new(source_type: SourceType, text: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source_type,
            chunk_index,
            item_index: None,
            token_count: 0,
            metadata: ChunkMetadata::default(),
            content: None,
        }
    }

    pub fn section(&self) -> &str {
        &self.metadata.section
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.metadata.section = section.into();
        self
    }

    pub fn with_chunk_type(mut self, chunk_type: impl Into<String>) -> Self {
        self.metadata.chunk_type = Some(chunk_type.into());
        self
    }

    pub fn with_source_keys(mut self, keys: Vec<String>) -> Self {
        self.metadata.source_keys = keys;
        self
    }

    pub fn with_item_index(mut self, item_index: usize) -> Self {
        self.item_index = Some(item_index);
        self
    }

    pub fn with_token_count(mut self, token_count: usize) -> Self {
        self.token_count = token_count;
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = Some(content);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<String>,
    /// Top-level keys of the JSON record a free-text chunk was rendered from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_keys: Vec<String>,
}

impl Default for ChunkMetadata {
    fn default() -> Self {
        Self {
            section: DEFAULT_SECTION.to_string(),
            chunk_type: None,
            source_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

impl ScoredChunk {
    /// Provenance tag placed in front of the chunk text inside prompts.
    pub fn source_tag(&self) -> String {
        format!(
            "[Source: {} - {} - Chunk {}]",
            self.chunk.source_type,
            self.chunk.section(),
            self.chunk.chunk_index
        )
    }
}

/// Post-search restriction applied by the vector index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkFilter {
    pub source_type: Option<SourceType>,
    pub section: Option<String>,
}

impl ChunkFilter {
    pub fn is_empty(&self) -> bool {
        self.source_type.is_none() && self.section.is_none()
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        self.source_type.map_or(true, |s| chunk.source_type == s)
            && self
                .section
                .as_deref()
                .map_or(true, |s| chunk.section() == s)
    }
}
