mod analysis;
mod config;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod matching;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::vocabulary::SkillVocabulary;
use crate::generation::service::LlmGenerationService;
use crate::generation::sessions::SessionStore;
use crate::llm_client::LlmClient;
use crate::matching::scoring::VerbatimPhraseScorer;
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lettercraft API v{}", env!("CARGO_PKG_VERSION"));

    // Load the skill vocabulary once; shared read-only from here on
    let vocabulary = match &config.skills_file {
        Some(path) => SkillVocabulary::from_file(path)?,
        None => SkillVocabulary::default(),
    };
    info!("Skill vocabulary loaded ({} phrases)", vocabulary.len());

    // Initialize LLM client
    let llm = LlmClient::new(
        config.groq_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
        config.llm_timeout,
    )?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm.model(),
        config.llm_timeout.as_secs()
    );

    // In-memory sessions, swept once a minute
    let sessions = SessionStore::new(config.session_ttl, config.max_sessions);
    sessions.spawn_sweeper(SESSION_SWEEP_PERIOD);
    info!(
        "Session store ready (ttl: {}s, max: {})",
        config.session_ttl.as_secs(),
        config.max_sessions
    );

    // Build app state
    let state = AppState::new(
        vocabulary,
        Arc::new(VerbatimPhraseScorer),
        Arc::new(LlmGenerationService::new(llm)),
        sessions,
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a front-end host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
