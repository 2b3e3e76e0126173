//! # Site Search Index
//!
//! The core of the site search indexer. It builds the per-site index
//! schema, models documents conforming to it, builds search and suggest
//! queries, turns raw engine responses into client payloads and manages
//! the index lifecycle.
//!
//! ## Architecture
//!
//! 1. **Schema**: analyzers, tokenizers, filters and field mappings per locale
//! 2. **Index**: the schema plus hooks and response processors for one site,
//!    memoized in an [`IndexRegistry`]
//! 3. **Document**: a property map restricted to the fields its index declares
//! 4. **Query**: search and suggest query bodies and the [`QueryService`]
//! 5. **Response**: pagination, highlighting and suggestion ranking
//! 6. **Lifecycle**: index creation and deletion, ingest pipeline provisioning

pub mod document;
pub mod errors;
pub mod extractor;
pub mod hooks;
pub mod index;
pub mod lifecycle;
pub mod query;
pub mod response;
pub mod schema;

pub use document::{entry_document_id, Document};
pub use errors::IndexError;
pub use extractor::{ContentExtractor, MarkupExtractor};
pub use hooks::{DocumentHook, HookOutcome, IndexHook, PreCreateOutcome, QueryHook};
pub use index::{index_name, Index, IndexBuilder, IndexInitializer, IndexRegistry};
pub use lifecycle::{AttachmentPipeline, IndexLifecycle, ATTACHMENT_PIPELINE};
pub use query::QueryService;
pub use response::{
    DefaultSearchResponseProcessor, DefaultSuggestResponseProcessor, LinkBuilder, ResponseContext,
    SearchResponseProcessor, SpellingPolicy, SuggestResponseProcessor,
};
pub use schema::{
    build_mappings, build_settings_for_locale, resolve_analyzer, resolve_stopwords, Schema,
};
