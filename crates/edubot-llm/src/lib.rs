//! Streaming chat-completion client for EduBot.
//!
//! This crate wraps an OpenAI-compatible `/chat/completions` endpoint in
//! streaming mode. The orchestrator only depends on the
//! [`CompletionService`] trait, so tests can swap in a scripted service.
//!
//! # Example
//!
//! ```rust,no_run
//! use edubot_core::ChatMessage;
//! use edubot_llm::{CompletionRequest, CompletionService, OpenAiClient};
//! use futures_util::StreamExt;
//!
//! async fn ask() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAiClient::new("https://api.openai.com/v1", "sk-...");
//!     let request = CompletionRequest::new("gpt-4o-mini", vec![ChatMessage::user("Hi")], 0.7);
//!
//!     let mut stream = client.create_stream(request).await?;
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(text) = chunk?.delta_text() {
//!             print!("{}", text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod service;
mod sse;
mod types;

// Re-export main types
pub use client::OpenAiClient;
pub use error::CompletionError;
pub use service::{CompletionService, DeltaStream};
pub use sse::{SseDecoder, SseFrame};
pub use types::{ChunkChoice, ChunkDelta, CompletionChunk, CompletionRequest, WireMessage};
