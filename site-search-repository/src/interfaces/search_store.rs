//! Search store trait definition.
//!
//! This module defines the abstract interface for the external keyed
//! document store, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, test doubles).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{IndexDocumentRequest, SearchRequest};

/// Abstracts the underlying search store implementation.
///
/// Implementations are injected into the index lifecycle, indexing and
/// query services. All methods return `Result<T, SearchError>`; a missing
/// index, document or pipeline must be reported as
/// [`SearchError::NotFound`], a rejected request as
/// [`SearchError::BadRequest`] and transport failures as
/// [`SearchError::ConnectionError`].
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Create an index. `body` carries `mappings` and optionally `settings`.
    async fn create_index(&self, name: &str, body: &Value) -> Result<(), SearchError>;

    /// Delete an index.
    ///
    /// # Returns
    ///
    /// * `Err(SearchError::NotFound)` - If the index does not exist
    async fn delete_index(&self, name: &str) -> Result<(), SearchError>;

    /// Number of documents in an index.
    ///
    /// # Returns
    ///
    /// * `Err(SearchError::NotFound)` - If the index does not exist, so
    ///   callers can tell "empty index" from "no index"
    async fn count(&self, name: &str) -> Result<u64, SearchError>;

    /// Index (create or replace) a single document.
    async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchError>;

    /// Fetch the stored source of a document.
    async fn get_document(&self, index: &str, id: &str) -> Result<Value, SearchError>;

    /// Delete a single document.
    ///
    /// # Returns
    ///
    /// * `Err(SearchError::NotFound)` - If the document does not exist
    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError>;

    /// Execute a search and return the raw engine response.
    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError>;

    /// Fetch the next page of a scroll cursor.
    async fn scroll(&self, scroll_id: &str, keep_alive: &str) -> Result<Value, SearchError>;

    /// Fetch an ingest pipeline definition.
    async fn get_pipeline(&self, id: &str) -> Result<Value, SearchError>;

    /// Create or replace an ingest pipeline.
    async fn put_pipeline(&self, id: &str, body: &Value) -> Result<(), SearchError>;

    /// Check if the store is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchError>;
}
