//! OpenSearch implementation of the search store.
//!
//! This module provides a concrete implementation of `SearchStore`
//! using OpenSearch as the backend.

mod store;

pub use store::OpenSearchStore;
