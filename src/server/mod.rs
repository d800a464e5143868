//! HTTP API for predictions and accuracy statistics
//!
//! One poll per `/api/predict` request: fetch the history, run an
//! engine cycle, answer. A failed fetch still answers 200 with a
//! degraded payload so callers never see a bare fault.

use crate::client::HistorySource;
use crate::engine::{PredictionEngine, PredictionResponse, StatsResponse};
use crate::error::Result;
use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;

/// Shared state across handlers
pub struct AppState {
    pub engine: Arc<PredictionEngine>,
    pub source: Arc<dyn HistorySource>,
}

async fn root() -> &'static str {
    "Tài/Xỉu prediction bot. Endpoints: /api/predict, /api/stats"
}

async fn health_check() -> &'static str {
    "OK"
}

/// One lookup-and-predict cycle
async fn get_prediction(State(state): State<Arc<AppState>>) -> Json<PredictionResponse> {
    match state.source.fetch().await {
        Ok(history) => Json(state.engine.run_cycle(&history)),
        Err(e) => {
            tracing::warn!("history fetch failed: {}", e);
            Json(state.engine.degraded_response(e.to_string()))
        }
    }
}

/// Current ledger and cached prediction, no computation
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(state.engine.stats())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/predict", get(get_prediction))
        .route("/api/stats", get(get_stats))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("prediction API listening on http://{}:{}", host, port);
    axum::serve(listener, app).await?;
    Ok(())
}
