//! HTTP surface: health checks plus the WebSocket upgrade route.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, Router},
    Json,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::websocket::WebSocketHandler;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/ws/:session_id", get(WebSocketHandler::handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.sessions.count();
    let at_capacity = state.sessions.is_at_capacity();
    Json(json!({
        "status": if at_capacity { "at_capacity" } else { "ready" },
        "sessions": sessions,
        "reference_words": state.reference_index.len(),
    }))
}
