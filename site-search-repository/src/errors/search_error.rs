//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search store. The variants keep the three surfaces callers must tell
//! apart: "not found", "bad request" and connectivity.

use thiserror::Error;

/// Errors that can occur during search store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Failed to reach the search store (network failure or timeout).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The index, document or pipeline does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store rejected the request, e.g. invalid settings or mappings.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Search or scroll execution failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to index a document or create an index or pipeline.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Failed to delete a document or an index.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to parse a response from the store.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether the error reports a missing index, document or pipeline.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether retrying the operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
