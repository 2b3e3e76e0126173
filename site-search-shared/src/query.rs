use serde::{Deserialize, Serialize};

/// Default page size for search and suggest requests.
pub const DEFAULT_SIZE: u64 = 10;

/// Upper bound for the number of suggestions per source.
pub const MAX_SUGGEST_SIZE: u64 = 25;

/// User supplied search or suggest input.
///
/// `from`/`size` arrive as signed integers from the query string; negative
/// values are interpreted by their absolute value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInput {
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlight: bool,
}

impl QueryInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: i64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Search offset: absolute value of `from`, defaulting to 0.
    pub fn search_from(&self) -> u64 {
        self.from.map(i64::unsigned_abs).unwrap_or(0)
    }

    /// Search page size: absolute value of `size`, defaulting to 10.
    pub fn search_size(&self) -> u64 {
        self.size.map(i64::unsigned_abs).unwrap_or(DEFAULT_SIZE)
    }

    /// Suggest size, clamped to `1..=25`, defaulting to 10.
    pub fn suggest_size(&self) -> u64 {
        self.size
            .map(i64::unsigned_abs)
            .unwrap_or(DEFAULT_SIZE)
            .clamp(1, MAX_SUGGEST_SIZE)
    }

    /// Input parameters as query string pairs, in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            pairs.push(("query".to_string(), query.clone()));
        }
        if let Some(from) = self.from {
            pairs.push(("from".to_string(), from.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        if self.highlight {
            pairs.push(("highlight".to_string(), "1".to_string()));
        }
        pairs
    }
}
