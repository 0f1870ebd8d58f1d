use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use profile_rag::application::IngestionService;
use profile_rag::domain::chunking::{build_chunker, ChunkingStrategy};
use profile_rag::infrastructure::{
    build_vector_index, init_tracing, load_bundle, AppConfig, OpenAiEmbedder, VectorStoreKind,
};

/// Chunk, embed and store a profile bundle.
#[derive(Debug, Parser)]
#[command(name = "ingest", version, about)]
struct Args {
    /// Profile bundle JSON; defaults to `ingest.bundle_path` from the config file
    #[arg(env = "PROFILE_BUNDLE")]
    bundle: Option<PathBuf>,

    /// Overrides `chunking.strategy`
    #[arg(short, long, value_enum)]
    strategy: Option<ChunkingStrategy>,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(bundle) = self.bundle {
            config.ingest.bundle_path = bundle;
        }
        if let Some(strategy) = self.strategy {
            config.chunking.strategy = strategy;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing("ingest=debug,profile_rag=debug");

    let mut config = AppConfig::load()?;
    args.apply(&mut config);

    let bundle = load_bundle(&config.ingest.bundle_path)?;

    let chunker = build_chunker(&config.chunking)?;
    let embedder = Arc::new(OpenAiEmbedder::from_config(&config.embedding)?);
    let index = build_vector_index(&config).await?;
    if config.vector_store.kind == VectorStoreKind::Memory {
        warn!("in-memory vector store selected, chunks are discarded on exit");
    }

    let service = IngestionService::new(chunker, embedder, index)
        .with_embed_delay(Duration::from_millis(config.embedding.embedding_delay_ms));

    let report = service.ingest_bundle(&bundle).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_bundle_and_strategy() {
        let args = Args::try_parse_from(["ingest", "me.json", "--strategy", "structured"]).unwrap();

        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.ingest.bundle_path, PathBuf::from("me.json"));
        assert_eq!(config.chunking.strategy, ChunkingStrategy::Structured);
    }

    #[test]
    fn test_defaults_come_from_config() {
        let args = Args::try_parse_from(["ingest", "-s", "sliding_window"]).unwrap();
        assert_eq!(args.strategy, Some(ChunkingStrategy::SlidingWindow));

        let mut config = AppConfig::default();
        let before = config.ingest.bundle_path.clone();
        Args {
            bundle: None,
            strategy: None,
        }
        .apply(&mut config);
        assert_eq!(config.ingest.bundle_path, before);
    }

    #[test]
    fn test_unknown_strategy_and_help_are_rejected() {
        assert!(Args::try_parse_from(["ingest", "--strategy", "recursive"]).is_err());

        let help = Args::try_parse_from(["ingest", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
