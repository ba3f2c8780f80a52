//! Negative-affect word lexicon.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::CoreError;

/// Immutable set of lowercase negative-affect tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegativeLexicon {
    words: BTreeSet<String>,
}

impl NegativeLexicon {
    /// An empty lexicon; detection never fires.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a lexicon from arbitrary tokens (trimmed, lowercased, blanks dropped).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parse newline-delimited entries.
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.lines())
    }

    /// Load a newline-delimited lexicon file.
    ///
    /// A missing file yields [`CoreError::ResourceMissing`] so the caller can
    /// decide to continue with [`NegativeLexicon::empty`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CoreError::ResourceMissing(path.display().to_string()))
            }
            Err(e) => Err(CoreError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    /// Lexicon tokens occurring as substrings of the lowercased text, in
    /// lexicon order.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.words
            .iter()
            .filter(|w| lowered.contains(w.as_str()))
            .cloned()
            .collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
