//! Chat turn orchestration.
//!
//! A turn runs as a spawned producer task that owns the session lock for
//! its whole lifetime and feeds streamed chunks into a bounded channel.
//! When the consumer goes away the task stops polling upstream, which
//! drops (and so aborts) the completion request.

use std::sync::Arc;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use edubot_core::{AffectAssessment, BehaviorSignal, CoreError, SessionId};
use edubot_llm::{CompletionError, CompletionRequest};

use crate::metrics::TurnOutcome;
use crate::state::AppState;

/// Most recent history messages sent upstream per turn.
pub const CONTEXT_WINDOW: usize = 6;

const CHANNEL_CAPACITY: usize = 32;

/// Errors surfaced by a chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or malformed request field.
    #[error("{0}")]
    InvalidRequest(String),

    /// The completion service failed before or during streaming.
    #[error("Upstream failure: {0}")]
    Upstream(#[from] CompletionError),

    /// Server-side failure unrelated to the request.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ChatError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidRequest(message) => ChatError::InvalidRequest(message),
            other => ChatError::Internal(other.to_string()),
        }
    }
}

/// One unit of model output forwarded to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedChunk {
    pub content: String,
    /// Milliseconds from invocation to this chunk; first chunk only.
    pub inference_time_ms: Option<u64>,
}

/// Output of a turn: chunks in order, ending early with an error on failure.
pub type TurnStream = ReceiverStream<Result<StreamedChunk, ChatError>>;

/// A validated user turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session_id: SessionId,
    pub message: String,
    pub behavior: Option<BehaviorSignal>,
}

impl Turn {
    /// Validate raw request fields.
    pub fn new(
        session_id: Option<&str>,
        message: Option<String>,
        behavior: Option<BehaviorSignal>,
    ) -> Result<Self, ChatError> {
        let session_id = SessionId::parse(session_id.unwrap_or_default())?;
        let message =
            message.ok_or_else(|| ChatError::InvalidRequest("Message required".to_string()))?;
        Ok(Self {
            session_id,
            message,
            behavior,
        })
    }
}

/// Orchestrates chat turns against the shared state.
pub struct ChatService {
    state: Arc<AppState>,
}

impl ChatService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start a turn and return its chunk stream.
    ///
    /// Turns on the same session run one after another; dropping the
    /// returned stream cancels the turn.
    pub fn handle_turn(&self, turn: Turn) -> TurnStream {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = self.state.clone();
        tokio::spawn(async move {
            let outcome = run_turn(&state, turn, &tx).await;
            state.metrics.record_turn(outcome);
        });
        ReceiverStream::new(rx)
    }
}

type ChunkSender = mpsc::Sender<Result<StreamedChunk, ChatError>>;

async fn run_turn(state: &AppState, turn: Turn, tx: &ChunkSender) -> TurnOutcome {
    let Turn {
        session_id,
        message,
        behavior,
    } = turn;

    let handle = state.sessions.get_or_create(&session_id).await;
    let mut history = tokio::select! {
        _ = tx.closed() => {
            info!(session_id = %session_id, "Client left before turn started");
            return TurnOutcome::Cancelled;
        }
        guard = handle.lock_owned() => guard,
    };

    let assessment = AffectAssessment::assess(&state.lexicon, &message, behavior.as_ref());
    if assessment.is_triggered() {
        info!(
            session_id = %session_id,
            words = ?assessment.detected_words,
            stressed = assessment.stressed,
            "Affect signal detected"
        );
        state
            .metrics
            .record_affect(!assessment.detected_words.is_empty(), assessment.stressed);
    }

    history.push_user(message);

    let mut window = history.window(CONTEXT_WINDOW);
    assessment.apply_to(&mut window);

    let request = CompletionRequest::new(
        state.config.model.clone(),
        window,
        state.config.temperature,
    );

    let started = Instant::now();
    let opened = tokio::select! {
        _ = tx.closed() => {
            info!(session_id = %session_id, "Client disconnected, cancelling upstream request");
            return TurnOutcome::Cancelled;
        }
        opened = state.completion.create_stream(request) => opened,
    };

    let mut deltas = match opened {
        Ok(deltas) => deltas,
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Completion request failed");
            let _ = tx.send(Err(e.into())).await;
            return TurnOutcome::Failed;
        }
    };
    debug!(session_id = %session_id, "Completion stream opened");

    let mut reply = String::new();
    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                info!(
                    session_id = %session_id,
                    partial_len = reply.len(),
                    "Client disconnected mid-stream, dropping partial reply"
                );
                return TurnOutcome::Cancelled;
            }
            next = deltas.next() => next,
        };

        let chunk = match next {
            None => break,
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                warn!(
                    session_id = %session_id,
                    error = %e,
                    partial_len = reply.len(),
                    "Completion stream failed, dropping partial reply"
                );
                let _ = tx.send(Err(e.into())).await;
                return TurnOutcome::Failed;
            }
        };

        let Some(text) = chunk.delta_text() else {
            continue;
        };

        let inference_time_ms = if reply.is_empty() {
            let ms = elapsed_ms(started);
            info!(session_id = %session_id, latency_ms = ms, "First delta received");
            Some(ms)
        } else {
            None
        };
        reply.push_str(text);

        let streamed = StreamedChunk {
            content: text.to_string(),
            inference_time_ms,
        };
        if tx.send(Ok(streamed)).await.is_err() {
            info!(session_id = %session_id, "Client disconnected mid-stream, dropping partial reply");
            return TurnOutcome::Cancelled;
        }
    }

    info!(session_id = %session_id, reply_len = reply.len(), "Turn completed");
    if !reply.is_empty() {
        history.push_assistant(reply);
    }
    TurnOutcome::Completed
}

fn elapsed_ms(since: Instant) -> u64 {
    (since.elapsed().as_secs_f64() * 1000.0).round() as u64
}
