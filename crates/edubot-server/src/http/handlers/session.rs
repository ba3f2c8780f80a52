//! Session creation handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use edubot_core::SessionId;

use crate::http::responses::StartSessionResponse;
use crate::state::AppState;

/// POST /start_session - Allocate a session and seed its history.
pub async fn start_session(State(state): State<Arc<AppState>>) -> Json<StartSessionResponse> {
    let id = SessionId::generate();
    state.sessions.get_or_create(&id).await;
    info!(session_id = %id, "Session started");

    Json(StartSessionResponse {
        session_id: id.into_inner(),
    })
}
