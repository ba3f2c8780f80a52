//! EduBot Server Library
//!
//! This crate provides the tutoring chat service: per-session conversation
//! state, affect-aware turn orchestration, and the HTTP/SSE surface.

pub mod config;
pub mod http;
pub mod metrics;
pub mod service;
pub mod session;
pub mod state;

pub use config::Config;
pub use service::{ChatError, ChatService, StreamedChunk, Turn};
pub use session::{SessionHandle, SessionStore};
pub use state::AppState;

#[cfg(test)]
pub(crate) mod testing;
