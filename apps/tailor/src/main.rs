mod config;
mod documents;
mod errors;
mod extractors;
mod jobs;
mod llm_client;
mod pipeline;
mod render;
mod resume;
mod routes;
mod state;
mod templates;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::FsDocumentStore;
use crate::jobs::JobFetcher;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::render::LatexRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tailor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the filesystem document store
    let store = FsDocumentStore::open(&config.storage_dir)
        .await
        .with_context(|| format!("opening document store at {}", config.storage_dir.display()))?;

    // Initialize LLM client
    let llm = LlmClient::new(LlmSettings {
        api_key: config.llm_api_key.clone(),
        base_url: config.llm_base_url.clone(),
        model: config.llm_model.clone(),
        timeout: config.llm_timeout_secs.map(Duration::from_secs),
    })
    .context("building LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());
    if config.llm_api_key.is_none() {
        tracing::warn!("LLM_API_KEY is not set; completion calls will fail");
    }

    // Initialize the LaTeX render bridge
    let renderer =
        LatexRenderer::new(config.latex_compiler.clone()).with_work_root(config.render_work_dir.clone());
    info!("LaTeX compiler: {}", renderer.program());

    // Initialize the job listing fetcher
    let jobs = JobFetcher::new(Duration::from_secs(config.job_fetch_timeout_secs))
        .context("building job listing fetcher")?;

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        llm,
        renderer: Arc::new(renderer),
        jobs,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
