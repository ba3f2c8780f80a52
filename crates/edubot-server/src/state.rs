//! Shared application state.

use std::sync::Arc;

use tracing::{info, warn};

use edubot_core::{CoreError, NegativeLexicon};
use edubot_llm::CompletionService;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::session::SessionStore;

/// Shared application state.
pub struct AppState {
    /// Conversation histories indexed by session.
    pub sessions: SessionStore,

    /// Negative-word lexicon, fixed for the process lifetime.
    pub lexicon: NegativeLexicon,

    /// Upstream model endpoint.
    pub completion: Arc<dyn CompletionService>,

    pub config: Config,

    pub metrics: Metrics,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(
        config: Config,
        lexicon: NegativeLexicon,
        completion: Arc<dyn CompletionService>,
    ) -> Arc<Self> {
        Arc::new(Self {
            sessions: SessionStore::new(),
            lexicon,
            completion,
            config,
            metrics: Metrics::default(),
        })
    }
}

/// Load the lexicon, degrading to an empty one if it cannot be read.
pub fn load_lexicon(path: &str) -> NegativeLexicon {
    info!(path = %path, "Loading negative words");
    match NegativeLexicon::from_file(path) {
        Ok(lexicon) => {
            info!(words = lexicon.len(), "Negative-word lexicon loaded");
            lexicon
        }
        Err(CoreError::ResourceMissing(path)) => {
            warn!(path = %path, "Lexicon not found, lexical affect detection disabled");
            NegativeLexicon::empty()
        }
        Err(e) => {
            warn!(error = %e, "Failed to read lexicon, lexical affect detection disabled");
            NegativeLexicon::empty()
        }
    }
}
