use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use talentiq_api::config::Config;
use talentiq_api::llm_client::LlmClient;
use talentiq_api::routes::build_router;
use talentiq_api::scoring::{KeywordOverlapScorer, LlmSemanticScorer, SemanticScorer};
use talentiq_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first (fails on malformed scoring defaults)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "talentiq_api={0},api={0},tower_http={0}",
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentIQ API v{}", env!("CARGO_PKG_VERSION"));

    // Semantic scorer: Claude when an API key is configured, keyword overlap otherwise
    let semantic: Arc<dyn SemanticScorer> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.llm_model.clone())?;
            info!("LLM semantic scorer initialized (model: {})", llm.model());
            Arc::new(LlmSemanticScorer(llm))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set, using keyword overlap semantic scorer");
            Arc::new(KeywordOverlapScorer)
        }
    };

    let weights = config.scoring.weights();
    info!(
        "Scoring defaults: alpha={} beta={} gamma={} delta={} policy={} timeout={:?} fallback={:?}",
        weights.alpha,
        weights.beta,
        weights.gamma,
        weights.delta,
        config.policy,
        config.scoring.semantic_timeout(),
        config.scoring.semantic_fallback()
    );

    // Build app state
    let state = AppState::new(config.clone(), semantic);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
