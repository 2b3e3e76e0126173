//! # Site Search Repository
//!
//! This crate provides the contract for the external keyed document store
//! the site search indexer writes to and queries, together with a concrete
//! implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::StoreConfig;
pub use errors::SearchError;
pub use interfaces::SearchStore;
pub use opensearch::OpenSearchStore;
pub use types::{IndexDocumentRequest, SearchRequest};
