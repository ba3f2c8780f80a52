//! Scripted completion service for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use edubot_core::NegativeLexicon;
use edubot_llm::{CompletionChunk, CompletionError, CompletionRequest, CompletionService, DeltaStream};

use crate::config::Config;
use crate::state::AppState;

/// What the scripted service does for one call.
pub(crate) enum Reply {
    /// Stream these deltas, then finish.
    Deltas(Vec<CompletionChunk>),
    /// Stream these deltas, then fail.
    FailAfter(Vec<CompletionChunk>, String),
    /// Stream these deltas, then never yield again.
    Stall(Vec<CompletionChunk>),
    /// Refuse to open the stream.
    Reject(String),
}

impl Reply {
    pub(crate) fn texts(parts: &[&str]) -> Self {
        Reply::Deltas(parts.iter().map(|p| CompletionChunk::text(*p)).collect())
    }
}

/// Completion service replaying canned replies and recording requests.
pub(crate) struct ScriptedCompletion {
    replies: Mutex<VecDeque<Reply>>,
    pub(crate) requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub(crate) fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn create_stream(&self, request: CompletionRequest) -> Result<DeltaStream, CompletionError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::texts(&["ok"]));

        let stream: DeltaStream = match reply {
            Reply::Deltas(chunks) => Box::pin(stream::iter(chunks.into_iter().map(Ok::<_, CompletionError>))),
            Reply::FailAfter(chunks, message) => Box::pin(
                stream::iter(chunks.into_iter().map(Ok::<_, CompletionError>))
                    .chain(stream::once(async move { Err(CompletionError::Protocol(message)) })),
            ),
            Reply::Stall(chunks) => Box::pin(
                stream::iter(chunks.into_iter().map(Ok::<_, CompletionError>)).chain(stream::pending()),
            ),
            Reply::Reject(message) => {
                return Err(CompletionError::Status {
                    status: 429,
                    body: message,
                })
            }
        };
        Ok(stream)
    }
}

/// State with a `{sad, tired}` lexicon and a scripted service.
pub(crate) fn test_state_with(replies: Vec<Reply>) -> (Arc<AppState>, Arc<ScriptedCompletion>) {
    let completion = ScriptedCompletion::new(replies);
    let state = AppState::new(
        Config::default(),
        NegativeLexicon::from_words(["sad", "tired"]),
        completion.clone(),
    );
    (state, completion)
}

pub(crate) fn test_state(replies: Vec<Reply>) -> Arc<AppState> {
    test_state_with(replies).0
}
