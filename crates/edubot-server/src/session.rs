//! Process-wide session store.
//!
//! Maps session identifiers to their conversation history. Each history
//! sits behind its own async mutex so a turn can hold it for the whole
//! request/stream/persist cycle without blocking other sessions. The map
//! lock is only ever held for lookup, insert, and sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use edubot_core::{ConversationHistory, SessionId, HISTORY_CAPACITY, SYSTEM_PROMPT};

use crate::state::AppState;

/// Shared, lockable handle to one session's history.
pub type SessionHandle = Arc<Mutex<ConversationHistory>>;

struct SessionEntry {
    history: SessionHandle,
    last_access: Instant,
}

/// Owner of every session's conversation history.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    system_prompt: String,
    capacity: usize,
}

impl SessionStore {
    /// Store seeding new sessions with the tutoring prompt.
    pub fn new() -> Self {
        Self::with_prompt(SYSTEM_PROMPT, HISTORY_CAPACITY)
    }

    /// Store with a custom seed prompt and history capacity.
    pub fn with_prompt(system_prompt: impl Into<String>, capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            capacity,
        }
    }

    /// Fetch the session's history, creating it (seeded with the system
    /// prompt) on first access. Refreshes the idle timer.
    pub async fn get_or_create(&self, id: &SessionId) -> SessionHandle {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_access = now;
            return entry.history.clone();
        }

        let history = Arc::new(Mutex::new(ConversationHistory::with_capacity(
            self.capacity,
            self.system_prompt.clone(),
        )));
        sessions.insert(
            id.clone(),
            SessionEntry {
                history: history.clone(),
                last_access: now,
            },
        );
        info!(session_id = %id, "Session created");
        history
    }

    /// Look up an existing session without creating or touching it.
    pub async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|entry| entry.history.clone())
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove sessions idle for at least `ttl`. Sessions whose handle is
    /// held elsewhere (a turn in flight) are kept. Returns the number evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let in_use = Arc::strong_count(&entry.history) > 1;
            let keep = in_use || entry.last_access.elapsed() < ttl;
            if !keep {
                debug!(session_id = %id, "Evicting idle session");
            }
            keep
        });
        before - sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically evict idle sessions until `shutdown` fires.
pub async fn run_sweeper(state: Arc<AppState>, shutdown: CancellationToken) {
    let ttl = state.config.session_ttl();
    let mut ticker = tokio::time::interval(state.config.sweep_interval());
    // The first tick completes immediately.
    ticker.tick().await;

    info!(ttl_secs = ttl.as_secs(), "Session sweeper started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Session sweeper stopped");
                return;
            }
            _ = ticker.tick() => {
                let evicted = state.sessions.evict_idle(ttl).await;
                if evicted > 0 {
                    state.metrics.record_evictions(evicted);
                    let remaining = state.sessions.len().await;
                    info!(evicted, remaining, "Swept idle sessions");
                }
            }
        }
    }
}
