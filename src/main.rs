use profile_rag::api::{create_router, AppState};
use profile_rag::application::{
    ChatService, IngestionService, PromptAssembler, QueryClassifier, QueryRewriter, Retriever,
};
use profile_rag::domain::chunking::build_chunker;
use profile_rag::domain::ports::{Embedder, VectorIndex};
use profile_rag::infrastructure::{
    build_generator, build_vector_index, init_tracing, load_bundle, AppConfig, OpenAiEmbedder,
    VectorStoreKind,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The in-memory store starts empty, so the configured bundle is ingested at boot.
async fn seed_in_memory(
    config: &AppConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
) -> anyhow::Result<()> {
    let bundle = load_bundle(&config.ingest.bundle_path)?;
    let service = IngestionService::new(build_chunker(&config.chunking)?, embedder, index)
        .with_embed_delay(Duration::from_millis(config.embedding.embedding_delay_ms));

    let report = service.ingest_bundle(&bundle).await?;
    info!(stored = report.stored(), "in-memory index seeded");
    Ok(())
}

async fn build_chat_service(config: &AppConfig) -> anyhow::Result<ChatService> {
    let generator = build_generator(&config.llm)?;
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::from_config(&config.embedding)?);
    let index = build_vector_index(config).await?;

    if config.vector_store.kind == VectorStoreKind::Memory {
        seed_in_memory(config, embedder.clone(), index.clone()).await?;
    }

    let subject = config.persona.name.as_str();
    Ok(ChatService::new(
        QueryClassifier::new(generator.clone(), subject)
            .with_max_history_turns(config.llm.max_history_turns),
        QueryRewriter::new(generator.clone(), subject, config.rewrite.clone())
            .with_max_history_turns(config.llm.max_history_turns),
        Retriever::new(embedder, index, config.retrieval.clone()),
        PromptAssembler::new(config.persona.clone())
            .with_max_history_turns(config.llm.max_history_turns),
        generator,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("api=debug,profile_rag=debug,tower_http=debug");

    let config = AppConfig::load()?;
    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        persona = %config.persona.name,
        "config loaded"
    );

    let chat = Arc::new(build_chat_service(&config).await?);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let app = create_router(AppState::new(chat, config));

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
