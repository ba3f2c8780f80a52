//! Streaming chat handler.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::{Stream, StreamExt};
use tracing::{info, warn};

use crate::http::error::ApiError;
use crate::http::responses::{ChatRequest, ChunkFrame, ErrorResponse};
use crate::service::{ChatError, ChatService, StreamedChunk, Turn};
use crate::state::AppState;

/// POST /chat - Run one turn and stream the reply as SSE.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    json_result: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match json_result {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Invalid JSON in request body");
            return ApiError::InvalidJson {
                message: rejection.body_text(),
            }
            .into_response();
        }
    };

    let turn = match Turn::new(req.session_id.as_deref(), req.message, req.behavior) {
        Ok(turn) => turn,
        Err(e) => {
            warn!(error = %e, "Rejected chat request");
            return ApiError::from(e).into_response();
        }
    };

    info!(
        session_id = %turn.session_id,
        message_len = turn.message.len(),
        has_behavior = turn.behavior.is_some(),
        "Received chat turn"
    );

    let chunks = ChatService::new(state).handle_turn(turn);
    Sse::new(to_events(chunks))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn to_events(
    chunks: impl Stream<Item = Result<StreamedChunk, ChatError>> + Send,
) -> impl Stream<Item = Result<Event, Infallible>> + Send {
    chunks.map(|item| {
        Ok(match item {
            Ok(chunk) => chunk_event(chunk),
            Err(e) => error_event(&e.to_string()),
        })
    })
}

fn chunk_event(chunk: StreamedChunk) -> Event {
    let frame = ChunkFrame {
        content: chunk.content,
        inference_time: chunk.inference_time_ms,
    };
    match serde_json::to_string(&frame) {
        Ok(data) => Event::default().data(data),
        Err(e) => error_event(&e.to_string()),
    }
}

fn error_event(message: &str) -> Event {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    let data = serde_json::to_string(&body)
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
    Event::default().event("error").data(data)
}
