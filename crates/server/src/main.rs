//! Document QA Server Entry Point

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use docqa_config::{constants::env_keys, load_settings, Settings};
use docqa_llm::{CohereBackend, CohereBackendConfig, LlmBackend};
use docqa_rag::{
    CohereEmbedder, CohereEmbeddingConfig, Embedder, IndexBootstrap, QaConfig, QaPipeline,
};
use docqa_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, the environment may already be populated
    dotenvy::dotenv().ok();

    // Priority: env vars > config/{env} > config/default > defaults
    let env = std::env::var(env_keys::APP_ENV).ok();
    let config = load_settings(env.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config);

    tracing::info!("Starting Document QA Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    config
        .validate_credentials()
        .context("Please set the COHERE_API_KEY environment variable in your .env file")?;

    let embedder: Arc<dyn Embedder> = Arc::new(CohereEmbedder::new(
        CohereEmbeddingConfig::from(&config.cohere),
    )?);

    let index = IndexBootstrap::new(&config.rag, embedder.clone())
        .prepare()
        .await
        .with_context(|| format!("Failed to prepare index from {}", config.rag.docs_dir))?;
    tracing::info!(
        chunks = index.len(),
        dimension = index.dimension(),
        policy = ?config.rag.index_policy,
        "Vector index ready"
    );

    let llm: Arc<dyn LlmBackend> =
        Arc::new(CohereBackend::new(CohereBackendConfig::from(&config.cohere))?);
    let qa = QaPipeline::new(
        Arc::new(index),
        embedder,
        llm,
        QaConfig::from(&config.rag),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;

    let state = AppState::new(config, Arc::new(qa))?;
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("docqa={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
