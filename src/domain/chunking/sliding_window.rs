use tracing::debug;

use super::sections::SectionTagger;
use super::sentences::split_sentences;
use super::tokens::TokenCounter;
use super::{Chunker, ChunkingStrategy};
use crate::domain::{Chunk, ProfileDocument, SourceType};

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_OVERLAP_SIZE: usize = 50;

/// Token-bounded chunks built from whole sentences, each seeded with the
/// tail of its predecessor.
///
/// Sentences are the atomic unit: a chunk only exceeds `chunk_size` when it
/// consists of a single sentence that is already larger than that.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    counter: TokenCounter,
    tagger: SectionTagger,
    chunk_size: usize,
    overlap_size: usize,
}

impl SlidingWindowChunker {
    pub fn new(counter: TokenCounter, chunk_size: usize, overlap_size: usize) -> Self {
        Self {
            counter,
            tagger: SectionTagger::new(),
            chunk_size,
            overlap_size,
        }
    }

    pub fn with_defaults(counter: TokenCounter) -> Self {
        Self::new(counter, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP_SIZE)
    }

    pub fn chunk_text(&self, text: &str, source_type: SourceType) -> Vec<Chunk> {
        let sentences = split_sentences(text);
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for sentence in sentences {
            if !current.is_empty() && self.joined_tokens(&current, &sentence) > self.chunk_size {
                let chunk_text = current.join(" ");
                current = self.overlap_seed(&chunk_text, &sentence);
                chunks.push(self.build_chunk(chunk_text, source_type, chunks.len()));
            }
            current.push(sentence);
        }

        if !current.is_empty() {
            chunks.push(self.build_chunk(current.join(" "), source_type, chunks.len()));
        }

        debug!(
            source_type = %source_type,
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            overlap_size = self.overlap_size,
            "sliding window chunking finished"
        );
        chunks
    }

    /// Renders a profile document to readable text and chunks that.
    pub fn chunk_document(&self, document: &ProfileDocument) -> Vec<Chunk> {
        let keys = document.top_level_keys();

        self.chunk_text(&document.to_text(), document.source_type())
            .into_iter()
            .map(|chunk| chunk.with_source_keys(keys.clone()))
            .collect()
    }

    fn joined_tokens(&self, current: &[String], next: &str) -> usize {
        let mut text = current.join(" ");
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(next);
        self.counter.count(&text)
    }

    /// Sentences carried from the end of the emitted chunk into the next one.
    ///
    /// Leading pieces are dropped while the seed plus `next` would not fit.
    fn overlap_seed(&self, emitted: &str, next: &str) -> Vec<String> {
        if self.overlap_size == 0 {
            return Vec::new();
        }

        let tail = self.counter.tail(emitted, self.overlap_size);
        let mut seed = split_sentences(&tail);
        while !seed.is_empty() && self.joined_tokens(&seed, next) > self.chunk_size {
            seed.remove(0);
        }
        seed
    }

    fn build_chunk(&self, text: String, source_type: SourceType, chunk_index: usize) -> Chunk {
        let section = self.tagger.tag(&text, source_type);
        let token_count = self.counter.count(&text);

        Chunk::new(source_type, text, chunk_index)
            .with_section(section)
            .with_token_count(token_count)
    }
}

impl Chunker for SlidingWindowChunker {
    fn strategy(&self) -> ChunkingStrategy {
        ChunkingStrategy::SlidingWindow
    }

    fn chunk(&self, document: &ProfileDocument) -> Vec<Chunk> {
        self.chunk_document(document)
    }
}
