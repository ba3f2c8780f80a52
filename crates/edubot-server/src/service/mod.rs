//! Service layer.

mod chat_service;

pub use chat_service::{ChatError, ChatService, StreamedChunk, Turn, TurnStream, CONTEXT_WINDOW};
