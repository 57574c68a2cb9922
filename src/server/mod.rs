// src/server/mod.rs
// Explain proxy: shared state, router and serve loop

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::explain;
use crate::config::ServerConfig;
use crate::llm::{GeminiClient, TextGenerator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// External model used for every explanation
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

/// Create the proxy router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(explain::health))
        .route("/explain", post(explain::explain))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let generator = GeminiClient::with_model(config.api_key.clone(), config.model.clone());
    let state = AppState::new(Arc::new(generator));
    let app = create_router(state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(model = %config.model, "Explain proxy listening on http://{}", bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}
