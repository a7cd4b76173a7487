use mpbf_core::MpbfConfig;
use mpbf_learning::LearningLogger;
use mpbf_llm::HttpCompletionClient;
use mpbf_pipeline::{CommandPipeline, TracingNotifier};
use mpbf_server::{AppState, create_router};
use mpbf_store::PgStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path =
        std::env::var("MPBF_CONFIG").unwrap_or_else(|_| "mpbf.yaml".to_string());
    let config = MpbfConfig::load(&config_path)?;

    let store = Arc::new(PgStore::connect(&config.database).await?);
    let client = Arc::new(HttpCompletionClient::new(config.llm.clone())?);
    let learning = LearningLogger::new(config.learning.clone())?;

    let pipeline = CommandPipeline::new(client, store, learning, Arc::new(TracingNotifier));
    let app = create_router(AppState::new(pipeline));

    let addr = config.server.bind.clone();
    tracing::info!("mpbf-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
