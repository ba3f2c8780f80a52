//! The completion-service seam.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::CompletionError;
use crate::types::{CompletionChunk, CompletionRequest};

/// Ordered, finite, non-restartable sequence of delta events.
///
/// Dropping the stream abandons the underlying request.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk, CompletionError>> + Send>>;

/// A model endpoint that can stream a chat completion.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Open a streaming completion for the given messages.
    async fn create_stream(&self, request: CompletionRequest) -> Result<DeltaStream, CompletionError>;
}
