//! Question answering over one person's profile: chunking and ingestion of
//! résumé, LinkedIn and GitHub data, and a classify → rewrite → retrieve →
//! generate query pipeline.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
