use std::collections::HashSet;
use std::sync::Arc;

use site_search_repository::SearchStore;
use site_search_shared::Site;

use crate::errors::PipelineError;

/// The configured sites and the store each one is indexed in.
#[derive(Default, Clone)]
pub struct SiteStores {
    sites: Vec<(Site, Arc<dyn SearchStore>)>,
}

impl SiteStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, site: Site, store: Arc<dyn SearchStore>) -> Self {
        self.sites.push((site, store));
        self
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter().map(|(site, _)| site)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Site, &Arc<dyn SearchStore>)> {
        self.sites.iter().map(|(site, store)| (site, store))
    }

    pub fn resolve(&self, site_id: u32) -> Result<(&Site, &Arc<dyn SearchStore>), PipelineError> {
        self.sites
            .iter()
            .find(|(site, _)| site.id == site_id)
            .map(|(site, store)| (site, store))
            .ok_or(PipelineError::UnknownSite(site_id))
    }

    pub fn site(&self, site_id: u32) -> Result<&Site, PipelineError> {
        self.resolve(site_id).map(|(site, _)| site)
    }

    pub fn store(&self, site_id: u32) -> Result<Arc<dyn SearchStore>, PipelineError> {
        self.resolve(site_id).map(|(_, store)| store.clone())
    }
}

/// Set of section handles. Empty or `*` means every section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SectionFilter {
    #[default]
    All,
    Only(HashSet<String>),
}

impl SectionFilter {
    /// Parse a comma separated list of section handles.
    pub fn parse(list: &str) -> Self {
        Self::from_handles(list.split(','))
    }

    pub fn from_handles<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let handles: HashSet<String> = handles
            .into_iter()
            .map(|handle| handle.as_ref().trim().to_string())
            .filter(|handle| !handle.is_empty())
            .collect();

        if handles.is_empty() || handles.contains("*") {
            Self::All
        } else {
            Self::Only(handles)
        }
    }

    pub fn contains(&self, section: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(handles) => handles.contains(section),
        }
    }
}
