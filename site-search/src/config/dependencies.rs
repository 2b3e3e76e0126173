//! Dependency initialization and wiring for the site search indexer.

use std::sync::Arc;

use site_search_index::{IndexRegistry, QueryService};
use site_search_pipeline::{EntrySource, HttpPageFetcher, SiteStores, TaskQueue};
use site_search_repository::{OpenSearchStore, SearchStore};
use tracing::{info, warn};

use super::SiteSearchConfig;
use crate::{SiteSearch, SiteSearchError, SiteSearchOptions};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The facade, ready to serve requests and run tasks.
    pub site_search: SiteSearch,
}

impl Dependencies {
    /// Connect one store per configured site and wire the facade.
    ///
    /// `entries` and `queue` are provided by the host CMS.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(SiteSearchError)` - If a store cannot be created or a store
    ///   is unreachable
    pub async fn new(
        config: &SiteSearchConfig,
        entries: Arc<dyn EntrySource>,
        queue: Arc<dyn TaskQueue>,
    ) -> Result<Self, SiteSearchError> {
        info!(
            environment = %config.environment,
            sites = config.sites.len(),
            base_url = %config.base_url,
            "Initializing dependencies"
        );

        let mut sites = SiteStores::new();
        for site in &config.sites {
            let store = OpenSearchStore::new(config.store_config(site)).map_err(|e| {
                SiteSearchError::config(format!("Failed to create store for site {}: {}", site.handle, e))
            })?;

            let healthy = store.health_check().await.map_err(|e| {
                SiteSearchError::config(format!("Health check failed for site {}: {}", site.handle, e))
            })?;
            if !healthy {
                warn!(site = %site.handle, "Search cluster reports an unhealthy state");
            }

            sites = sites.with_site(site.clone(), Arc::new(store));
        }

        info!("Search stores connected");

        let registry = config
            .analyzers
            .iter()
            .fold(IndexRegistry::new(&config.environment), |registry, (language, analyzer)| {
                registry.with_analyzer(language.as_deref(), analyzer.clone())
            });

        let query_service = QueryService::new(&config.base_url)?;

        let fetcher = HttpPageFetcher::new(config.fetch_config())
            .map_err(|e| SiteSearchError::config(format!("Failed to create page fetcher: {}", e)))?;

        let options = SiteSearchOptions {
            auto_index: config.auto_index,
            indexable_sections: config.indexable_sections.clone(),
            updatable_sections: config.updatable_sections.clone(),
        };

        let site_search = SiteSearch::new(
            sites,
            registry,
            query_service,
            Arc::new(fetcher),
            entries,
            queue,
            options,
        );

        Ok(Self { site_search })
    }
}
