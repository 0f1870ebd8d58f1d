//! In-process fakes for the domain ports.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::{
    ports::{Embedder, Generator, SearchRequest, VectorIndex},
    Chunk, ConversationTurn, DomainError, Embedding, ScoredChunk, SourceType,
};

/// Replays queued responses in order; fails once the queue is exhausted.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, DomainError>>>,
    prompts: Mutex<Vec<String>>,
    histories: Mutex<Vec<Vec<ConversationTurn>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(responses: &[&str]) -> Self {
        let generator = Self::new();
        for r in responses {
            generator.push_ok(r);
        }
        generator
    }

    /// Nothing scripted: every call fails.
    pub fn failing() -> Self {
        Self::new()
    }

    pub fn push_ok(&self, response: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
    }

    pub fn push_err(&self, error: DomainError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// History passed with each call, in call order.
    pub fn histories(&self) -> Vec<Vec<ConversationTurn>> {
        self.histories.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.histories.lock().unwrap().push(history.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::generation("no scripted response")))
    }
}

pub enum EmbedBehavior {
    Constant(Vec<f32>),
    Empty,
    Fail,
    /// Fails for texts containing the marker, constant vector otherwise.
    FailOn(String, Vec<f32>),
}

pub struct FakeEmbedder {
    behavior: EmbedBehavior,
    texts: Mutex<Vec<String>>,
}

impl FakeEmbedder {
    pub fn new(behavior: EmbedBehavior) -> Self {
        Self {
            behavior,
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(vector: Vec<f32>) -> Self {
        Self::new(EmbedBehavior::Constant(vector))
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.texts.lock().unwrap().push(text.to_string());
        match &self.behavior {
            EmbedBehavior::Constant(v) => Ok(Embedding::new(v.clone())),
            EmbedBehavior::Empty => Ok(Embedding::new(Vec::new())),
            EmbedBehavior::Fail => Err(DomainError::embedding("embedder unavailable")),
            EmbedBehavior::FailOn(marker, v) => {
                if text.contains(marker.as_str()) {
                    Err(DomainError::embedding("rejected input"))
                } else {
                    Ok(Embedding::new(v.clone()))
                }
            }
        }
    }

    fn dimension(&self) -> usize {
        match &self.behavior {
            EmbedBehavior::Constant(v) | EmbedBehavior::FailOn(_, v) => v.len(),
            _ => 0,
        }
    }
}

/// Returns canned search results and records every call made against it.
#[derive(Default)]
pub struct FakeIndex {
    results: Vec<ScoredChunk>,
    fail_search: bool,
    requests: Mutex<Vec<SearchRequest>>,
    operations: Mutex<Vec<String>>,
    stored: Mutex<Vec<Chunk>>,
}

impl FakeIndex {
    pub fn with_results(results: Vec<ScoredChunk>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    /// Nothing scripted: every call fails.
    pub fn failing() -> Self {
        Self {
            fail_search: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<Chunk> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn upsert(&self, chunk: &Chunk, _embedding: &Embedding) -> Result<(), DomainError> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("upsert:{}", chunk.source_type));
        self.stored.lock().unwrap().push(chunk.clone());
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredChunk>, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_search {
            return Err(DomainError::index("index offline"));
        }
        Ok(self.results.clone())
    }

    async fn delete_by_source(&self, source_type: SourceType) -> Result<(), DomainError> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("delete:{source_type}"));
        Ok(())
    }
}
