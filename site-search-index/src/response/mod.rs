//! Turning raw engine responses into client payloads.
//!
//! Both processors are strategies chosen when the index is built; the
//! defaults are [`DefaultSearchResponseProcessor`] and
//! [`DefaultSuggestResponseProcessor`].

mod links;
mod search;
mod suggest;

pub use links::LinkBuilder;
pub use search::DefaultSearchResponseProcessor;
pub use suggest::{DefaultSuggestResponseProcessor, SpellingPolicy};

use serde_json::Value;
use site_search_shared::QueryInput;

use crate::errors::IndexError;

/// Request side of a processed response.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub input: &'a QueryInput,
    pub links: &'a LinkBuilder,
    /// Offset sent to the engine.
    pub from: u64,
    /// Page size sent to the engine.
    pub size: u64,
}

pub trait SearchResponseProcessor: Send + Sync {
    fn process(&self, context: &ResponseContext<'_>, response: &Value) -> Result<Value, IndexError>;
}

pub trait SuggestResponseProcessor: Send + Sync {
    fn process(&self, context: &ResponseContext<'_>, response: &Value) -> Result<Value, IndexError>;
}
