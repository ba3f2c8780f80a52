//! HTTP request and response types.

use serde::{Deserialize, Serialize};

use edubot_core::BehaviorSignal;

/// Request body for the chat endpoint.
///
/// Fields are optional so that missing values surface as our own 400
/// messages rather than a generic deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub behavior: Option<BehaviorSignal>,
}

/// Response body for the start-session endpoint.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Payload of one streamed `data:` frame.
#[derive(Debug, Serialize)]
pub struct ChunkFrame {
    pub content: String,

    /// Milliseconds to first delta; first frame only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_time: Option<u64>,
}
