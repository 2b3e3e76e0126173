//! Per-site index configuration.

mod builder;
mod registry;

pub use builder::{IndexBuilder, IndexInitializer};
pub use registry::IndexRegistry;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use site_search_shared::Site;

use crate::extractor::ContentExtractor;
use crate::hooks::{DocumentHook, IndexHook, QueryHook};
use crate::response::{SearchResponseProcessor, SuggestResponseProcessor};
use crate::schema::Schema;

/// Stored fields returned for every search hit.
pub const SOURCE_INCLUDES: [&str; 4] = ["title", "description", "url", "imageUrl"];

/// Index name for a site in an environment.
pub fn index_name(environment: &str, site_id: u32) -> String {
    format!("{}-site-{}-default", environment, site_id)
}

/// Immutable configuration of one site's index.
///
/// Built once through an [`IndexBuilder`] and shared as `Arc<Index>`.
pub struct Index {
    name: String,
    site: Site,
    schema: Schema,
    properties: Vec<(String, Value)>,
    source_includes: Vec<String>,
    extractor: Arc<dyn ContentExtractor>,
    document_hooks: Vec<Arc<dyn DocumentHook>>,
    query_hooks: Vec<Arc<dyn QueryHook>>,
    index_hooks: Vec<Arc<dyn IndexHook>>,
    search_processor: Arc<dyn SearchResponseProcessor>,
    suggest_processor: Arc<dyn SuggestResponseProcessor>,
}

impl Index {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn locale(&self) -> &str {
        &self.schema.locale
    }

    pub fn analyzer(&self) -> &str {
        &self.schema.analyzer
    }

    pub fn stopwords(&self) -> &str {
        &self.schema.stopwords
    }

    /// Declared properties in registration order.
    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|(key, _)| key == name)
    }

    pub fn source_includes(&self) -> &[String] {
        &self.source_includes
    }

    pub fn settings(&self) -> Value {
        self.schema.settings()
    }

    pub fn mappings(&self) -> Value {
        let properties: Map<String, Value> = self.properties.iter().cloned().collect();
        json!({ "properties": properties })
    }

    /// Body of the create index request. Settings are left out when empty.
    pub fn create_body(&self) -> Value {
        let mut body = json!({ "mappings": self.mappings() });
        let settings = self.settings();
        if settings.as_object().is_some_and(|settings| !settings.is_empty()) {
            body["settings"] = settings;
        }
        body
    }

    pub fn extractor(&self) -> Arc<dyn ContentExtractor> {
        self.extractor.clone()
    }

    pub fn document_hooks(&self) -> &[Arc<dyn DocumentHook>] {
        &self.document_hooks
    }

    pub fn query_hooks(&self) -> &[Arc<dyn QueryHook>] {
        &self.query_hooks
    }

    pub fn index_hooks(&self) -> &[Arc<dyn IndexHook>] {
        &self.index_hooks
    }

    pub fn search_processor(&self) -> &dyn SearchResponseProcessor {
        self.search_processor.as_ref()
    }

    pub fn suggest_processor(&self) -> &dyn SuggestResponseProcessor {
        self.suggest_processor.as_ref()
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("site", &self.site)
            .field("schema", &self.schema)
            .field("properties", &self.properties.len())
            .field("document_hooks", &self.document_hooks.len())
            .field("query_hooks", &self.query_hooks.len())
            .field("index_hooks", &self.index_hooks.len())
            .finish()
    }
}
