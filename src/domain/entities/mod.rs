mod chunk;
mod classification;
mod conversation;
mod embedding;
mod profile;

pub use chunk::{Chunk, ChunkFilter, ChunkMetadata, ScoredChunk, SourceType, DEFAULT_SECTION};
pub use classification::Classification;
pub use conversation::{
    render_transcript, ConversationHistory, ConversationTurn, Role, MAX_HISTORY_TURNS,
};
pub use embedding::Embedding;
pub use profile::{
    Award, Certification, Education, GithubProfile, LinkedinProfile, ProfileBundle,
    ProfileDocument, Project, Repository, ResumeProfile, WorkExperience,
};
