//! Error types for the search store.

mod search_error;

pub use search_error::SearchError;
