use std::sync::Arc;

use serde_json::Value;
use site_search_shared::Site;
use tracing::debug;

use super::{index_name, Index, SOURCE_INCLUDES};
use crate::errors::IndexError;
use crate::extractor::{ContentExtractor, MarkupExtractor};
use crate::hooks::{DocumentHook, IndexHook, QueryHook};
use crate::lifecycle::AttachmentPipeline;
use crate::response::{
    DefaultSearchResponseProcessor, DefaultSuggestResponseProcessor, SearchResponseProcessor,
    SuggestResponseProcessor,
};
use crate::schema::Schema;

/// Callback run on every new [`IndexBuilder`] before the index is built.
pub type IndexInitializer = Arc<dyn Fn(&mut IndexBuilder) + Send + Sync>;

/// Collects properties, hooks and processors for an [`Index`].
pub struct IndexBuilder {
    environment: String,
    site: Site,
    analyzer: Option<String>,
    properties: Vec<(String, Value)>,
    extractor: Option<Arc<dyn ContentExtractor>>,
    document_hooks: Vec<Arc<dyn DocumentHook>>,
    query_hooks: Vec<Arc<dyn QueryHook>>,
    index_hooks: Vec<Arc<dyn IndexHook>>,
    search_processor: Option<Arc<dyn SearchResponseProcessor>>,
    suggest_processor: Option<Arc<dyn SuggestResponseProcessor>>,
}

impl IndexBuilder {
    pub fn new(environment: impl Into<String>, site: Site) -> Self {
        Self {
            environment: environment.into(),
            site,
            analyzer: None,
            properties: Vec::new(),
            extractor: None,
            document_hooks: Vec::new(),
            query_hooks: Vec::new(),
            index_hooks: Vec::new(),
            search_processor: None,
            suggest_processor: None,
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Use `analyzer` instead of the one resolved from the site language.
    pub fn analyzer(&mut self, analyzer: impl Into<String>) -> &mut Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Declare an additional property next to the default ones.
    ///
    /// Names must be unique within the index; duplicates fail [`build`](Self::build).
    pub fn add_property(&mut self, name: impl Into<String>, mapping: Value) -> &mut Self {
        self.properties.push((name.into(), mapping));
        self
    }

    pub fn extractor(&mut self, extractor: Arc<dyn ContentExtractor>) -> &mut Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn document_hook(&mut self, hook: Arc<dyn DocumentHook>) -> &mut Self {
        self.document_hooks.push(hook);
        self
    }

    pub fn query_hook(&mut self, hook: Arc<dyn QueryHook>) -> &mut Self {
        self.query_hooks.push(hook);
        self
    }

    /// Register an index hook. Hooks run before the default ingest
    /// pipeline provisioning.
    pub fn index_hook(&mut self, hook: Arc<dyn IndexHook>) -> &mut Self {
        self.index_hooks.push(hook);
        self
    }

    pub fn search_processor(&mut self, processor: Arc<dyn SearchResponseProcessor>) -> &mut Self {
        self.search_processor = Some(processor);
        self
    }

    pub fn suggest_processor(&mut self, processor: Arc<dyn SuggestResponseProcessor>) -> &mut Self {
        self.suggest_processor = Some(processor);
        self
    }

    pub fn build(self) -> Result<Index, IndexError> {
        let name = index_name(&self.environment, self.site.id);
        let schema = Schema::with_analyzer(&self.site.language, self.analyzer.as_deref());

        let mut properties = schema.properties();
        for (property, mapping) in self.properties {
            if properties.iter().any(|(existing, _)| *existing == property) {
                return Err(IndexError::configuration(format!(
                    "Property \"{}\" is already registered in index \"{}\"",
                    property, name
                )));
            }
            properties.push((property, mapping));
        }

        let mut index_hooks = self.index_hooks;
        index_hooks.push(Arc::new(AttachmentPipeline));

        debug!(
            index = %name,
            analyzer = %schema.analyzer,
            properties = properties.len(),
            "Built index configuration"
        );

        Ok(Index {
            name,
            site: self.site,
            schema,
            properties,
            source_includes: SOURCE_INCLUDES.iter().map(|field| field.to_string()).collect(),
            extractor: self.extractor.unwrap_or_else(|| Arc::new(MarkupExtractor)),
            document_hooks: self.document_hooks,
            query_hooks: self.query_hooks,
            index_hooks,
            search_processor: self
                .search_processor
                .unwrap_or_else(|| Arc::new(DefaultSearchResponseProcessor)),
            suggest_processor: self
                .suggest_processor
                .unwrap_or_else(|| Arc::new(DefaultSuggestResponseProcessor::default())),
        })
    }
}
