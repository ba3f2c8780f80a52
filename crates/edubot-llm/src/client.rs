//! reqwest-backed client for OpenAI-compatible endpoints.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CompletionError;
use crate::service::{CompletionService, DeltaStream};
use crate::sse::{SseDecoder, SseFrame};
use crate::types::{CompletionChunk, CompletionRequest};

/// Default bound on opening the stream and on the gap between frames.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Streaming chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a client for the given API base (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the open/idle timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn create_stream(&self, request: CompletionRequest) -> Result<DeltaStream, CompletionError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Opening completion stream"
        );

        let send = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send();

        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| CompletionError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response.text(), self.timeout).await;
            warn!(status = status.as_u16(), "Completion service rejected request");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(decode_stream(response.bytes_stream(), self.timeout))
    }
}

/// State threaded through the decoding stream.
struct DecodeState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
    idle_timeout: Duration,
    eof: bool,
    finished: bool,
}

/// Turn a raw SSE byte stream into completion chunks.
///
/// Ends at `[DONE]`. A body that closes before `[DONE]` yields a protocol
/// error; the first error terminates the stream.
pub(crate) fn decode_stream<S, B, E>(body: S, idle_timeout: Duration) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<CompletionError> + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        idle_timeout,
        eof: false,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }

            if let Some(frame) = st.pending.pop_front() {
                if frame.is_done() {
                    st.finished = true;
                    return None;
                }
                let item = parse_chunk(&frame);
                if item.is_err() {
                    st.finished = true;
                }
                return Some((item, st));
            }

            if st.eof {
                st.finished = true;
                return Some((
                    Err(CompletionError::Protocol(
                        "stream ended without [DONE]".to_string(),
                    )),
                    st,
                ));
            }

            match tokio::time::timeout(st.idle_timeout, st.body.next()).await {
                Err(_) => {
                    st.finished = true;
                    return Some((Err(CompletionError::Timeout), st));
                }
                Ok(Some(Ok(bytes))) => {
                    let frames = st.decoder.push(bytes.as_ref());
                    st.pending.extend(frames);
                }
                Ok(Some(Err(e))) => {
                    st.finished = true;
                    return Some((Err(e.into()), st));
                }
                Ok(None) => {
                    st.eof = true;
                    if let Some(frame) = st.decoder.finish() {
                        st.pending.push_back(frame);
                    }
                }
            }
        }
    }))
}

/// Read a rejection body, giving up after `timeout`.
async fn read_error_body<F, E>(body: F, timeout: Duration) -> String
where
    F: Future<Output = Result<String, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, body).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to read error response body");
            String::new()
        }
        Err(_) => {
            warn!("Timed out reading error response body");
            String::new()
        }
    }
}

fn parse_chunk(frame: &SseFrame) -> Result<CompletionChunk, CompletionError> {
    if frame.event.as_deref() == Some("error") {
        return Err(CompletionError::Protocol(error_event_message(&frame.data)));
    }

    let value: Value = serde_json::from_str(&frame.data)?;

    // Providers report mid-stream failures as an `error` object.
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(CompletionError::Protocol(message));
    }

    Ok(serde_json::from_value(value)?)
}

/// Best-effort message from an `event: error` payload.
fn error_event_message(data: &str) -> String {
    let message = serde_json::from_str::<Value>(data).ok().and_then(|value| {
        let source = value.get("error").unwrap_or(&value);
        source
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
    });
    match message {
        Some(message) => message,
        None if data.trim().is_empty() => "upstream error event".to_string(),
        None => data.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, CompletionError>> + Send + 'static {
        let parts: Vec<_> = parts.iter().map(|p| Ok::<_, CompletionError>(p.as_bytes().to_vec())).collect();
        stream::iter(parts)
    }

    async fn collect_texts(stream: DeltaStream) -> Vec<Result<Option<String>, String>> {
        stream
            .map(|item| {
                item.map(|c| c.delta_text().map(String::from))
                    .map_err(|e| e.to_string())
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_decodes_deltas_until_done() {
        let stream = decode_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: {\"choi",
                "ces\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
                "data: [DONE]\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
            ]),
            Duration::from_secs(5),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(
            texts,
            vec![Ok(None), Ok(Some("Hi".to_string())), Ok(Some(" there".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_malformed_chunk_terminates_stream() {
        let stream = decode_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
                "data: not-json\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n",
            ]),
            Duration::from_secs(5),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], Ok(Some("a".to_string())));
        assert!(texts[1].as_ref().unwrap_err().starts_with("JSON error"));
    }

    #[tokio::test]
    async fn test_error_object_surfaces_as_protocol_error() {
        let stream = decode_stream(
            body(&["data: {\"error\":{\"message\":\"quota exceeded\"}}\n\n"]),
            Duration::from_secs(5),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(texts, vec![Err("Protocol error: quota exceeded".to_string())]);
    }

    #[tokio::test]
    async fn test_body_without_done_is_truncated() {
        let stream = decode_stream(
            body(&["data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}"]),
            Duration::from_secs(5),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(
            texts,
            vec![
                Ok(Some("x".to_string())),
                Err("Protocol error: stream ended without [DONE]".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unterminated_done_frame_still_ends_cleanly() {
        let stream = decode_stream(
            body(&["data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\ndata: [DONE]"]),
            Duration::from_secs(5),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(texts, vec![Ok(Some("x".to_string()))]);
    }

    #[tokio::test]
    async fn test_error_event_without_error_key_fails_stream() {
        let stream = decode_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"content\":\"Par\"}}]}\n\n",
                "event: error\ndata: {\"message\":\"overloaded\",\"type\":\"overloaded_error\"}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"tial\"}}]}\n\n",
                "data: [DONE]\n\n",
            ]),
            Duration::from_secs(5),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(
            texts,
            vec![
                Ok(Some("Par".to_string())),
                Err("Protocol error: overloaded".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_event_message_fallbacks() {
        assert_eq!(error_event_message(r#"{"error":{"message":"quota"}}"#), "quota");
        assert_eq!(error_event_message("plain text"), "plain text");
        assert_eq!(error_event_message(""), "upstream error event");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_error_body_is_abandoned() {
        let body = read_error_body(
            std::future::pending::<Result<String, CompletionError>>(),
            Duration::from_secs(1),
        )
        .await;
        assert!(body.is_empty());

        let body = read_error_body(
            async { Ok::<_, CompletionError>("rate limited".to_string()) },
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(body, "rate limited");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_body_times_out() {
        let stream = decode_stream(
            stream::pending::<Result<Vec<u8>, CompletionError>>(),
            Duration::from_secs(1),
        );

        let texts = collect_texts(stream).await;
        assert_eq!(texts, vec![Err(CompletionError::Timeout.to_string())]);
    }

    #[test]
    fn test_completions_url() {
        let client = OpenAiClient::new("https://example.test/v1/", "key");
        assert_eq!(client.completions_url(), "https://example.test/v1/chat/completions");
    }
}
