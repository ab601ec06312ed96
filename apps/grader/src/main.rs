mod config;
mod errors;
mod evaluation;
mod llm_client;
mod routes;
mod rubric;
mod scoring;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::rubric::Catalogue;
use crate::scoring::{RemoteAiScorer, Scorer};
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

    info!("Starting grader v{}", env!("CARGO_PKG_VERSION"));

    // Load the rubric catalogue (read-only for the life of the process)
    let catalogue = match &config.catalogue_path {
        Some(path) => {
            info!("Loading catalogue from {}", path.display());
            Catalogue::load(path)?
        }
        None => Catalogue::builtin()?,
    };
    info!(
        "Catalogue ready: {} units, default rubric '{}'",
        catalogue.units.len(),
        catalogue.default_rubric.id()
    );

    // Remote scorer only when an API key is configured; local heuristic otherwise
    let remote: Option<Arc<dyn Scorer>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(
                key.clone(),
                config.remote_timeout,
                config.remote_max_attempts,
            )?;
            info!(
                "Remote scorer enabled (model: {}, timeout: {}s, attempts: {})",
                llm_client::MODEL,
                config.remote_timeout.as_secs(),
                config.remote_max_attempts
            );
            let scorer: Arc<dyn Scorer> =
                Arc::new(RemoteAiScorer::new(Arc::new(llm), config.remote_timeout));
            Some(scorer)
        }
        None => {
            info!("ANTHROPIC_API_KEY not set; using local heuristic scorer only");
            None
        }
    };

    info!("Flag thresholds: {:?}", config.flag_thresholds);
    let evaluator = Evaluator::new(Arc::new(catalogue), remote)
        .with_flag_thresholds(config.flag_thresholds);

    // Build app state
    let state = AppState {
        evaluator: Arc::new(evaluator),
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
