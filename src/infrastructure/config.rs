use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::application::{Persona, RetrievalOptions, RewriteOptions};
use crate::domain::{chunking::ChunkingOptions, DomainError, Result, MAX_HISTORY_TURNS};

pub const CONFIG_PATH_ENV: &str = "APP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingOptions,
    pub retrieval: RetrievalOptions,
    pub vector_store: VectorStoreConfig,
    pub ingest: IngestConfig,
    pub persona: Persona,
    pub rewrite: RewriteOptions,
    pub server: ServerConfig,
}

/// Message-array API (`gemini`) or single-prompt API (`anthropic`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
        })
    }
}

impl FromStr for LlmProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(DomainError::config(format!("unknown LLM provider: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Deadline for one chat request, all stages included.
    pub timeout_seconds: u64,
    pub max_history_turns: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            timeout_seconds: 60,
            max_history_turns: MAX_HISTORY_TURNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    /// Pause between embedding calls during ingestion.
    pub embedding_delay_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            embedding_delay_ms: 1000,
        }
    }
}

/// `qdrant` for deployments; `memory` keeps chunks in process for local runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    #[default]
    Qdrant,
    Memory,
}

impl fmt::Display for VectorStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Qdrant => "qdrant",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub kind: VectorStoreKind,
    /// Qdrant server; unused for the in-memory store.
    pub url: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            kind: VectorStoreKind::Qdrant,
            url: "http://localhost:6334".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Profile bundle read by `ingest`, and by `api` when the store is in memory.
    pub bundle_path: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bundle_path: PathBuf::from("data/profile_bundle.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Reads `.env`, the YAML file named by `APP_CONFIG` and the environment
    /// overrides, then validates the result.
    ///
    /// A missing config file is not an error; built-in defaults apply.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| DomainError::config(e.to_string()))
    }

    /// Deployment-specific values that may come from the environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Some(kind) = lookup("VECTOR_STORE") {
            self.vector_store.kind = match kind.to_lowercase().as_str() {
                "qdrant" => VectorStoreKind::Qdrant,
                "memory" => VectorStoreKind::Memory,
                other => {
                    return Err(DomainError::config(format!("unknown vector store: {other}")))
                }
            };
        }
        if let Some(name) = lookup("PERSONA_NAME") {
            self.persona.name = name;
        }
        if let Some(contact) = lookup("PERSONA_CONTACT") {
            self.persona.contact = contact;
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| DomainError::config(format!("invalid SERVER_PORT: {port}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(DomainError::config("chunking.chunk_size must be positive"));
        }
        if chunking.overlap_size >= chunking.chunk_size {
            return Err(DomainError::config(format!(
                "chunking.overlap_size ({}) must be smaller than chunk_size ({})",
                chunking.overlap_size, chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(DomainError::config("retrieval.top_k must be positive"));
        }
        if self.retrieval.candidate_multiplier == 0 {
            return Err(DomainError::config(
                "retrieval.candidate_multiplier must be positive",
            ));
        }
        if self.retrieval.index_name.is_empty() || self.retrieval.field_name.is_empty() {
            return Err(DomainError::config(
                "retrieval.index_name and retrieval.field_name are required",
            ));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(DomainError::config("llm.timeout_seconds must be positive"));
        }
        if self.persona.name.trim().is_empty() {
            return Err(DomainError::config(
                "persona.name is required (or set PERSONA_NAME)",
            ));
        }
        Ok(())
    }
}
