//! Request types for search store operations.

use std::time::Duration;

use serde_json::{Map, Value};

/// Timeout applied to single-document operations.
pub const DOCUMENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Request to index a single document.
///
/// The body is the flat property map of the document. When `pipeline` is
/// set the store runs the named ingest pipeline before storing it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocumentRequest {
    /// Name of the target index.
    pub index: String,
    /// Stable document id.
    pub id: String,
    /// Document properties.
    pub body: Map<String, Value>,
    /// Optional ingest pipeline id.
    pub pipeline: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl IndexDocumentRequest {
    /// Create a new index request without a pipeline.
    pub fn new(index: impl Into<String>, id: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body,
            pipeline: None,
            timeout: DOCUMENT_REQUEST_TIMEOUT,
        }
    }

    /// Run the document through an ingest pipeline.
    pub fn with_pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }
}

/// Request to search an index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    /// Name of the index to search.
    pub index: String,
    /// Query body.
    pub body: Value,
    /// Offset of the first hit.
    pub from: Option<u64>,
    /// Number of hits to return.
    pub size: Option<u64>,
    /// Source fields to return for each hit. Empty returns the full source.
    pub source_includes: Vec<String>,
    /// Stored fields to return for each hit.
    pub stored_fields: Option<Vec<String>>,
    /// Scroll keep-alive. When set the response carries a `_scroll_id`.
    pub scroll: Option<String>,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(index: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            body,
            ..Default::default()
        }
    }

    /// Set the offset of the first hit.
    pub fn with_from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the number of hits.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Restrict the returned source fields.
    pub fn with_source_includes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_includes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Request stored fields.
    pub fn with_stored_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stored_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Open a scroll cursor with the given keep-alive.
    pub fn with_scroll(mut self, keep_alive: impl Into<String>) -> Self {
        self.scroll = Some(keep_alive.into());
        self
    }
}
