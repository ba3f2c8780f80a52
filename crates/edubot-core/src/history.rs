//! Bounded per-session conversation history.

use std::collections::VecDeque;

use crate::chat::{ChatMessage, ChatRole};

/// Maximum number of messages retained per session, system prompt included.
pub const HISTORY_CAPACITY: usize = 20;

/// Ordered, bounded sequence of messages for one session.
///
/// The first message is the system prompt and is pinned: when the history
/// is full, the oldest non-system message is evicted instead.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ConversationHistory {
    /// Create a history seeded with the given system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_capacity(HISTORY_CAPACITY, system_prompt)
    }

    /// Create a history with a custom capacity (minimum 2: the pinned
    /// prompt plus one turn).
    pub fn with_capacity(capacity: usize, system_prompt: impl Into<String>) -> Self {
        let capacity = capacity.max(2);
        let mut messages = VecDeque::with_capacity(capacity);
        messages.push_back(ChatMessage::system(system_prompt));
        Self { messages, capacity }
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::user(content));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::assistant(content));
    }

    fn push(&mut self, message: ChatMessage) {
        if self.messages.len() >= self.capacity {
            let evict_at = match self.messages.front() {
                Some(first) if first.role == ChatRole::System => 1,
                _ => 0,
            };
            self.messages.remove(evict_at);
        }
        self.messages.push_back(message);
    }

    /// The last `size` messages, oldest first.
    pub fn window(&self, size: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(size);
        self.messages.iter().skip(skip).cloned().collect()
    }

    /// Iterate over all retained messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
