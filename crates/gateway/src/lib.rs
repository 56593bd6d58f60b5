//! HTTP API gateway for Locas.
//!
//! - `POST /api/process-query`: answer one query, optionally within a session
//! - `GET /api/chat-history/{session_id}`: a session's chat history
//! - `GET /health`: liveness plus session store reachability
//!
//! Built on Axum.

pub mod api;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use locas_agent::LocationAssistant;
use locas_config::AppConfig;
use locas_providers::ProviderSet;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Request body limit for every route.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub assistant: Arc<LocationAssistant>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the router with all gateway routes.
///
/// Layers:
/// - CORS (any origin) on `/api/*`
/// - 1 MB request body limit
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/process-query", post(api::process_query))
        .route("/chat-history/{session_id}", get(api::chat_history))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let providers = ProviderSet::from_config(&config)?;
    let store = locas_session::build_store(&config.session);
    info!(session_store = store.name(), "Session store ready");

    let assistant = Arc::new(LocationAssistant::from_providers(providers, store, &config));
    let app = build_router(Arc::new(GatewayState { assistant }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    session_store: String,
    session_store_reachable: bool,
    version: &'static str,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store = state.assistant.store();
    Json(HealthResponse {
        status: "ok",
        session_store: store.name().to_string(),
        session_store_reachable: store.ping().await,
        version: env!("CARGO_PKG_VERSION"),
    })
}
