//! Server configuration.

use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub http_addr: String,

    /// Base URL of the OpenAI-compatible completion API.
    pub api_base: String,

    /// Bearer credential for the completion API.
    pub api_key: String,

    /// Model identifier sent with every completion.
    pub model: String,

    /// Sampling temperature sent with every completion.
    pub temperature: f32,

    /// Path of the newline-delimited negative-word lexicon.
    pub lexicon_path: String,

    /// Idle time after which a session is swept (seconds).
    pub session_ttl_secs: u64,

    /// How often the session sweeper runs (seconds).
    pub sweep_interval_secs: u64,

    /// Bound on opening the upstream stream and on gaps between frames (seconds).
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:5000".to_string(),
            api_base: "https://api.openai-proxy.org/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            lexicon_path: "negative_words.txt".to_string(),
            session_ttl_secs: 3600,
            sweep_interval_secs: 60,
            upstream_timeout_secs: 60,
        }
    }
}
