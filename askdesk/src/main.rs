use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askdesk::api::{create_router, AppState};
use askdesk::config::Config;
use askdesk::db::{Database, LibSqlTranscripts, TranscriptStore};
use askdesk::embeddings::EmbeddingProvider;
use askdesk::llm::LlmProvider;
use askdesk::search::{QdrantIndex, VectorIndex};

#[derive(Parser)]
#[command(name = "askdesk")]
#[command(about = "Retrieval-augmented product support chat backend")]
struct Args {
    /// Skip the vector index readiness probe at startup
    #[arg(long)]
    skip_index_check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askdesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing transcript database...");
    let database = Database::new(&config.database).await?;
    let transcripts: Arc<dyn TranscriptStore> = Arc::new(LibSqlTranscripts::new(database));

    tracing::info!(url = %config.search.url, "Connecting to vector index...");
    let index: Arc<dyn VectorIndex> = Arc::new(QdrantIndex::new(&config.search)?);

    if args.skip_index_check {
        tracing::warn!("Skipping vector index readiness probe");
    } else {
        wait_for_index(&*index, config.search.ready_timeout_secs).await?;
    }

    tracing::info!(
        openai_model = %config.embeddings.openai.model,
        hf_model = %config.embeddings.huggingface.model,
        "Initializing embedding backends..."
    );
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    tracing::info!(
        primary = %config.llm.primary_model,
        secondary = %config.llm.secondary_model,
        "Initializing LLM provider..."
    );
    let llm = LlmProvider::new(&config.llm)?;

    let state = AppState::new(config.clone(), embeddings, llm, index, transcripts);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Askdesk starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  Chat socket:  ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Bounded wait for the vector index: the server must not accept chat turns
/// it cannot retrieve for.
async fn wait_for_index(index: &dyn VectorIndex, timeout_secs: u64) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);

    loop {
        match index.ping().await {
            Ok(()) => {
                tracing::info!("Vector index ready");
                return Ok(());
            }
            Err(error) if tokio::time::Instant::now() >= deadline => {
                return Err(anyhow::anyhow!(
                    "Vector index not ready within {timeout_secs}s: {error}"
                ));
            }
            Err(error) => {
                tracing::warn!(error = %error, "Vector index not ready, retrying...");
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, closing connections...");
}
