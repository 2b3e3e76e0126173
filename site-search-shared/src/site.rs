use serde::{Deserialize, Serialize};

/// A site of the content management system.
///
/// Each site has exactly one search index, analyzed for the site's language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Site {
    /// Numeric site id, used in index names and document ids.
    pub id: u32,
    /// Short handle used for per-site configuration lookups.
    pub handle: String,
    /// Language tag, e.g. `de`, `en-US` or `pt-BR`.
    pub language: String,
}

impl Site {
    pub fn new(id: u32, handle: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            language: language.into(),
        }
    }
}
