//! Affect detection and the emotional-support note.

use crate::behavior::{is_stressed, BehaviorSignal};
use crate::chat::ChatMessage;
use crate::lexicon::NegativeLexicon;

/// Result of scanning one user turn for affect signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectAssessment {
    /// Lexicon words found in the message.
    pub detected_words: Vec<String>,
    /// Behavioral heuristic verdict.
    pub stressed: bool,
}

impl AffectAssessment {
    /// Assess a user message and its optional behavior signal.
    pub fn assess(lexicon: &NegativeLexicon, text: &str, signal: Option<&BehaviorSignal>) -> Self {
        Self {
            detected_words: lexicon.detect(text),
            stressed: is_stressed(signal),
        }
    }

    /// Returns true if either signal fired.
    pub fn is_triggered(&self) -> bool {
        !self.detected_words.is_empty() || self.stressed
    }

    /// The synthetic system note describing what fired, if anything did.
    pub fn support_note(&self) -> Option<ChatMessage> {
        if !self.is_triggered() {
            return None;
        }

        let mut note = String::from("System Note: User appears to be experiencing ");
        if !self.detected_words.is_empty() {
            note.push_str(&format!(
                "negative emotions (detected words: {}). ",
                self.detected_words.join(", ")
            ));
        }
        if self.stressed {
            note.push_str("behavioral signs of stress (based on interaction patterns). ");
        }
        note.push_str("Please respond with appropriate emotional support.");

        Some(ChatMessage::system(note))
    }

    /// Insert the support note into an outbound window: right after a
    /// leading system message, otherwise at the front.
    pub fn apply_to(&self, window: &mut Vec<ChatMessage>) {
        let Some(note) = self.support_note() else {
            return;
        };
        let at = match window.first() {
            Some(first) if first.is_system() => 1,
            _ => 0,
        };
        window.insert(at, note);
    }
}
