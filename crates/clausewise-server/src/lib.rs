pub mod logging;
pub mod routes;

use std::{sync::Arc, time::Instant};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clausewise_analysis::Analyzer;
use clausewise_core::{config::Config, ingest::DocumentIngestor, nlu::NluClient};
use clausewise_nlu::{MockNluClient, WatsonNluClient};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

/// Room for multipart boundaries and headers on top of the file itself, so
/// the ingestor (not the body limit) reports files just over the limit.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub config: Config,
    pub analyzer: Analyzer,
    pub ingestor: DocumentIngestor,
    pub nlu: Arc<dyn NluClient>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, nlu: Arc<dyn NluClient>) -> anyhow::Result<Self> {
        Ok(Self {
            analyzer: Analyzer::new()?,
            ingestor: DocumentIngestor::from_config(&config),
            nlu,
            config,
            start_time: Instant::now(),
        })
    }
}

/// Live Watson client when credentials are configured, otherwise the mock.
pub fn nlu_client(config: &Config) -> Arc<dyn NluClient> {
    if config.nlu_configured() {
        Arc::new(WatsonNluClient::from_config(config))
    } else {
        warn!("Watson NLU API key not configured, using mock responses");
        Arc::new(MockNluClient::new())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let max = state.config.max_upload_bytes;
    let body_limit = max.saturating_add(BODY_OVERHEAD_BYTES);
    // compare carries two documents, each held to the per-document limit
    let compare_limit = max.saturating_mul(2).saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/upload", post(routes::upload))
        .route("/api/analyze", post(routes::analyze))
        .route(
            "/api/compare",
            post(routes::compare).layer(DefaultBodyLimit::max(compare_limit)),
        )
        .route("/api/watson-nlu", post(routes::watson_nlu))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
