//! EduBot Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - The language-model service
//! - Runtime specifics
//!
//! Everything here is synchronous and deterministic, so the orchestration
//! layer can be tested without a model behind it.

pub mod affect;
pub mod behavior;
pub mod chat;
pub mod error;
pub mod history;
pub mod ids;
pub mod lexicon;
pub mod prompt;

// Re-export commonly used types
pub use affect::AffectAssessment;
pub use behavior::{is_stressed, BehaviorSignal, TypingSpeed};
pub use chat::{ChatMessage, ChatRole};
pub use error::CoreError;
pub use history::{ConversationHistory, HISTORY_CAPACITY};
pub use ids::SessionId;
pub use lexicon::NegativeLexicon;
pub use prompt::SYSTEM_PROMPT;
