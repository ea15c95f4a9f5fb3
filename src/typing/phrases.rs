//! Phrase lists for the typing engine.
//!
//! A [`PhraseList`] is an ordered, non-empty, immutable sequence of phrases.
//! Phrases are usually supplied as a single pipe-delimited attribute
//! (`"Go|Rust"`); when that attribute is absent or yields nothing, the
//! caller-supplied defaults are used instead.

use std::sync::Arc;

/// Separator between phrases in the attribute form.
pub const PHRASE_SEPARATOR: char = '|';

/// Built-in phrase sequence used when no phrases are configured.
pub const DEFAULT_PHRASES: [&str; 4] = [
    "Cybersecurity Solutions",
    "Web Development",
    "Cloud Architecture",
    "AI & Machine Learning",
];

/// Ordered, non-empty list of phrases.
///
/// Cloning is cheap; the phrases are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseList {
    phrases: Arc<[Phrase]>,
}

/// One phrase plus its length in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Phrase {
    text: String,
    chars: usize,
}

impl PhraseList {
    /// Builds a phrase list, returning `None` when `phrases` is empty.
    #[must_use]
    pub fn new<I, S>(phrases: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<Phrase> = phrases
            .into_iter()
            .map(|p| {
                let text = p.into();
                let chars = text.chars().count();
                Phrase { text, chars }
            })
            .collect();

        if phrases.is_empty() {
            None
        } else {
            Some(Self {
                phrases: phrases.into(),
            })
        }
    }

    /// Parses a pipe-delimited attribute value.
    ///
    /// Segments are trimmed and blank segments dropped. Returns `None`
    /// if no phrase survives.
    #[must_use]
    pub fn parse(attribute: &str) -> Option<Self> {
        Self::new(
            attribute
                .split(PHRASE_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    /// Resolves the phrases for one display target.
    ///
    /// Uses the parsed `attribute` when it yields at least one phrase,
    /// otherwise `defaults`. Returns `None` only when both are empty,
    /// in which case the engine must not start.
    #[must_use]
    pub fn resolve(attribute: Option<&str>, defaults: &[&str]) -> Option<Self> {
        attribute
            .and_then(Self::parse)
            .or_else(|| Self::new(defaults.iter().copied()))
    }

    /// The built-in default list.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            phrases: DEFAULT_PHRASES
                .iter()
                .map(|p| Phrase {
                    text: (*p).to_string(),
                    chars: p.chars().count(),
                })
                .collect(),
        }
    }

    /// Number of phrases (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Always `false`; present for API symmetry with collections.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Phrase text at `index`, wrapping around the list.
    #[must_use]
    pub fn get(&self, index: usize) -> &str {
        &self.phrases[index % self.phrases.len()].text
    }

    /// Length in characters of the phrase at `index`, wrapping.
    #[must_use]
    pub fn char_len(&self, index: usize) -> usize {
        self.phrases[index % self.phrases.len()].chars
    }

    /// The first `chars` characters of the phrase at `index`.
    ///
    /// Slices on character boundaries so multi-byte phrases never split
    /// a code point.
    #[must_use]
    pub fn prefix(&self, index: usize, chars: usize) -> &str {
        let text = self.get(index);
        text.char_indices()
            .nth(chars)
            .map_or(text, |(byte, _)| &text[..byte])
    }

    /// Iterates over phrase texts in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(|p| p.text.as_str())
    }
}
