//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::responses::ErrorResponse;
use crate::service::ChatError;

/// Errors returned before a response stream starts.
#[derive(Debug)]
pub enum ApiError {
    /// Body could not be parsed as JSON.
    InvalidJson { message: String },

    /// A required field was missing or empty.
    BadRequest { message: String },

    /// The completion service failed.
    Upstream { message: String },

    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::InvalidJson { message } => (StatusCode::BAD_REQUEST, message),
            ApiError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            ApiError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            ApiError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::InvalidRequest(message) => ApiError::BadRequest { message },
            e @ ChatError::Upstream(_) => ApiError::Upstream {
                message: e.to_string(),
            },
            ChatError::Internal(message) => ApiError::Internal { message },
        }
    }
}
