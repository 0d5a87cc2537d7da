mod assist;
mod config;
mod document;
mod errors;
mod llm_client;
mod pagination;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assist::{Assistant, LlmAssistant};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pagination::select_probe_factory;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mimir API v{}", env!("CARGO_PKG_VERSION"));

    let probes = select_probe_factory(
        config.probe_backend,
        config.probe_command.as_deref(),
        config.probe_stylesheet.as_deref(),
    );
    info!(probe = probes.name(), "Height probe selected");

    let assistant: Option<Arc<dyn Assistant>> = match config.anthropic_api_key.clone() {
        Some(key) => {
            let llm = LlmClient::new(key)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(LlmAssistant::new(llm)))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI endpoints are disabled");
            None
        }
    };

    let port = config.port;
    let state = AppState::new(config, assistant, probes);
    info!(
        "Page budget: {:.2}px (padding {}px)",
        state.pagination.budget().max_height_px,
        state.config.page_padding_px
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
