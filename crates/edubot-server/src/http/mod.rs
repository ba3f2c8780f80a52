//! HTTP server for the tutoring chat.
//!
//! Provides endpoints for:
//! - Session creation (`/start_session`)
//! - Streaming chat turns (`/chat`)
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod error;
mod handlers;
pub mod responses;

pub use error::ApiError;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser front-ends are served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/start_session", post(handlers::start_session))
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, test_state_with, Reply};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use edubot_core::{ChatRole, SessionId};
    use serde_json::Value;
    use tower::ServiceExt;

    fn chat_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn data_frames(body: &str) -> Vec<Value> {
        body.split("\n\n")
            .filter_map(|frame| {
                frame
                    .lines()
                    .find_map(|line| line.strip_prefix("data: "))
                    .map(|data| serde_json::from_str(data).unwrap())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state(vec![]));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn test_start_session_creates_history() {
        let state = test_state(vec![]);
        let app = create_router(state.clone());
        let request = Request::builder()
            .method("POST")
            .uri("/start_session")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let id = json["session_id"].as_str().unwrap();
        assert!(!id.is_empty());

        let handle = state.sessions.get(&SessionId::new(id)).await.unwrap();
        let history = handle.lock().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().role, ChatRole::System);
    }

    #[tokio::test]
    async fn test_chat_without_session_id_is_rejected() {
        let state = test_state(vec![]);
        let app = create_router(state.clone());

        let response = app
            .oneshot(chat_request(serde_json::json!({ "message": "hello" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Session ID required" }));
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_chat_with_empty_session_id_is_rejected() {
        let app = create_router(test_state(vec![]));
        let response = app
            .oneshot(chat_request(
                serde_json::json!({ "message": "hello", "session_id": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_without_message_is_rejected() {
        let app = create_router(test_state(vec![]));
        let response = app
            .oneshot(chat_request(serde_json::json!({ "session_id": "s1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], "Message required");
    }

    #[tokio::test]
    async fn test_chat_with_malformed_json_is_rejected() {
        let app = create_router(test_state(vec![]));
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_chat_streams_frames() {
        let (state, _) = test_state_with(vec![Reply::texts(&["Hi", " there", "!"])]);
        let app = create_router(state.clone());

        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "hello",
                "session_id": "s1",
                "behavior": { "consecutiveBackspaces": 1 }
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));

        let frames = data_frames(&body_text(response).await);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0]["content"], "Hi");
        assert!(frames[0]["inference_time"].is_u64());
        assert_eq!(frames[1], serde_json::json!({ "content": " there" }));
        assert_eq!(frames[2], serde_json::json!({ "content": "!" }));

        let handle = state.sessions.get(&SessionId::new("s1")).await.unwrap();
        assert_eq!(handle.lock().await.last().unwrap().content, "Hi there!");
    }

    #[tokio::test]
    async fn test_chat_upstream_failure_ends_with_error_frame() {
        let (state, _) = test_state_with(vec![Reply::FailAfter(
            vec![edubot_llm::CompletionChunk::text("Par")],
            "boom".to_string(),
        )]);
        let app = create_router(state);

        let response = app
            .oneshot(chat_request(
                serde_json::json!({ "message": "hello", "session_id": "s1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("event: error"));
        let frames = data_frames(&body);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["content"], "Par");
        assert!(frames[1]["error"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = create_router(test_state(vec![]));
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert!(body_text(response)
            .await
            .contains("edubot_sessions_active 0"));
    }
}
