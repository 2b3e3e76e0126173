use serde::{Deserialize, Serialize};

/// Source a suggestion was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// Completion suggester on the phrase suggestion field.
    Phrase,
    /// Phrase (spelling correction) suggester.
    Spelling,
    /// Significant text aggregation bucket.
    Significant,
}

/// A single autocomplete or "did you mean" suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    /// Suggestion text with every word differing from the query wrapped in
    /// `<em>` tags.
    #[serde(default)]
    pub highlight: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, score: f64, kind: SuggestionKind) -> Self {
        Self {
            text: text.into(),
            score,
            kind,
            highlight: String::new(),
        }
    }

    /// Number of whitespace separated words in the suggestion text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
