use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use site_search_shared::Site;
use tracing::info;

use super::{Index, IndexBuilder, IndexInitializer};
use crate::errors::IndexError;

/// Builds each site's [`Index`] once and hands out shared references.
///
/// Construction runs under the registry lock so concurrent first accesses
/// for the same site never build the index twice. Built indexes are
/// immutable.
pub struct IndexRegistry {
    environment: String,
    analyzers: HashMap<String, String>,
    default_analyzer: Option<String>,
    initializers: Vec<IndexInitializer>,
    indexes: Mutex<HashMap<u32, Arc<Index>>>,
}

impl IndexRegistry {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            analyzers: HashMap::new(),
            default_analyzer: None,
            initializers: Vec::new(),
            indexes: Mutex::new(HashMap::new()),
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Configure the analyzer for sites of one language, or for every site
    /// when `language` is `None`.
    pub fn with_analyzer(mut self, language: Option<&str>, analyzer: impl Into<String>) -> Self {
        match language {
            Some(language) => {
                self.analyzers
                    .insert(language.to_ascii_lowercase(), analyzer.into());
            }
            None => self.default_analyzer = Some(analyzer.into()),
        }
        self
    }

    /// Register a callback run on every index builder before it is built.
    pub fn with_initializer(mut self, initializer: IndexInitializer) -> Self {
        self.initializers.push(initializer);
        self
    }

    fn analyzer_for(&self, language: &str) -> Option<&String> {
        self.analyzers
            .get(&language.to_ascii_lowercase())
            .or(self.default_analyzer.as_ref())
    }

    /// The index of `site`, building it on first access.
    pub fn get(&self, site: &Site) -> Result<Arc<Index>, IndexError> {
        let mut indexes = self.indexes.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(index) = indexes.get(&site.id) {
            return Ok(index.clone());
        }

        let mut builder = IndexBuilder::new(self.environment.clone(), site.clone());
        if let Some(analyzer) = self.analyzer_for(&site.language) {
            builder.analyzer(analyzer.clone());
        }
        for initializer in &self.initializers {
            initializer(&mut builder);
        }

        let index = Arc::new(builder.build()?);
        info!(site_id = site.id, index = %index.name(), "Initialized index");
        indexes.insert(site.id, index.clone());

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_index_is_memoized_per_site() {
        let registry = IndexRegistry::new("dev");
        let english = Site::new(1, "en", "en-US");
        let german = Site::new(2, "de", "de");

        let first = registry.get(&english).unwrap();
        let second = registry.get(&english).unwrap();
        let other = registry.get(&german).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.name(), "dev-site-2-default");
    }

    #[test]
    fn test_initializers_run_once_per_site() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = IndexRegistry::new("dev").with_initializer(Arc::new(move |builder: &mut IndexBuilder| {
            counter.fetch_add(1, Ordering::SeqCst);
            builder.add_property("author", json!({ "type": "keyword" }));
        }));

        let site = Site::new(1, "en", "en");
        let index = registry.get(&site).unwrap();
        registry.get(&site).unwrap();

        assert!(index.has_property("author"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_analyzer_configuration() {
        let registry = IndexRegistry::new("dev")
            .with_analyzer(Some("de"), "light_german")
            .with_analyzer(None, "standard");

        assert_eq!(registry.get(&Site::new(1, "de", "de")).unwrap().analyzer(), "light_german");
        assert_eq!(registry.get(&Site::new(2, "en", "en")).unwrap().analyzer(), "standard");
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let registry = IndexRegistry::new("dev").with_initializer(Arc::new(|builder: &mut IndexBuilder| {
            builder.add_property("title", json!({ "type": "keyword" }));
        }));

        let site = Site::new(1, "en", "en");
        assert!(matches!(registry.get(&site), Err(IndexError::Configuration(_))));
        assert!(matches!(registry.get(&site), Err(IndexError::Configuration(_))));
    }

    #[test]
    fn test_concurrent_access_builds_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = Arc::new(IndexRegistry::new("dev").with_initializer(Arc::new(move |_: &mut IndexBuilder| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get(&Site::new(1, "en", "en")).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
