//! Error types for the index core.

use site_search_repository::SearchError;
use thiserror::Error;

/// Errors that can occur while building, filling, querying or managing an index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// No indexable content could be extracted from a page.
    #[error("Markup extraction error: {0}")]
    MarkupExtraction(String),

    /// Invalid schema or settings, rejected by the store or caught while
    /// registering properties. Must not be retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing index or document.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store could not be reached.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Invalid or missing request input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A document property outside the declared schema was accessed.
    #[error("Property \"{property}\" is not registered in index \"{index}\"")]
    UnknownProperty { property: String, index: String },

    /// Any other store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl IndexError {
    /// Create a markup extraction error.
    pub fn markup_extraction(msg: impl Into<String>) -> Self {
        Self::MarkupExtraction(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unknown property error.
    pub fn unknown_property(property: impl Into<String>, index: impl Into<String>) -> Self {
        Self::UnknownProperty {
            property: property.into(),
            index: index.into(),
        }
    }

    /// Whether the error reports a missing index or document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the external task system may retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

impl From<SearchError> for IndexError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::ConnectionError(msg) => Self::Connectivity(msg),
            SearchError::NotFound(msg) => Self::NotFound(msg),
            other => Self::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_search_error() {
        assert_eq!(
            IndexError::from(SearchError::connection("refused")),
            IndexError::Connectivity("refused".to_string())
        );
        assert!(IndexError::from(SearchError::not_found("idx")).is_not_found());
        assert!(matches!(
            IndexError::from(SearchError::bad_request("mapping")),
            IndexError::Store(_)
        ));
    }

    #[test]
    fn test_only_connectivity_is_retryable() {
        assert!(IndexError::Connectivity("timeout".into()).is_retryable());
        assert!(!IndexError::configuration("duplicate").is_retryable());
        assert!(!IndexError::validation("query").is_retryable());
    }
}
