//! Search and suggest queries.

mod builder;
mod service;

pub use builder::{build_search_query, build_suggest_query, SEARCH_FIELDS};
pub use service::QueryService;
