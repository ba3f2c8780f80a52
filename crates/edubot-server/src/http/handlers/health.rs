//! Liveness and Prometheus scrape handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::metrics::collect_metrics;
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /health - Liveness plus the live session count.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let sessions = state.sessions.len().await;
    Json(json!({
        "status": "ok",
        "service": "edubot",
        "sessions": sessions,
    }))
}

/// GET /metrics - Counters in text exposition format.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let body = collect_metrics(&state).await;
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response()
}
