//! Configuration read from the process environment.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use site_search_pipeline::{FetchConfig, SectionFilter};
use site_search_repository::config::DEFAULT_HOST;
use site_search_repository::StoreConfig;
use site_search_shared::Site;
use tracing::debug;

use crate::SiteSearchError;

/// Default index name prefix.
const DEFAULT_ENVIRONMENT: &str = "dev";

/// Default public base URL used for pagination links.
const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Site used when `SEARCH_SITES` is not set.
const DEFAULT_SITES: &str = "1:default:en";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Settings of the site search indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSearchConfig {
    /// Prefix of every index name.
    pub environment: String,
    pub sites: Vec<Site>,
    /// Hosts used by sites without an override.
    pub hosts: Vec<String>,
    /// Host overrides keyed by lowercase site handle.
    pub site_hosts: HashMap<String, Vec<String>>,
    pub api_key: Option<(String, String)>,
    pub base_url: String,
    /// Internal base URL used when fetching entry pages.
    pub fetch_base_url: Option<String>,
    /// Analyzer overrides; `None` applies to every language.
    pub analyzers: Vec<(Option<String>, String)>,
    pub auto_index: bool,
    pub indexable_sections: SectionFilter,
    pub updatable_sections: SectionFilter,
    pub fetch_timeout: Duration,
    pub request_timeout: Duration,
}

impl SiteSearchConfig {
    /// Load the configuration from the environment, seeded from a `.env`
    /// file when one exists.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_ENVIRONMENT`: index name prefix (default: dev)
    /// - `SEARCH_SITES`: `id:handle:language` triples (default: 1:default:en)
    /// - `SEARCH_HOSTS`: comma separated hosts (default: http://localhost:9200)
    /// - `SEARCH_HOSTS_<HANDLE>`: hosts for one site
    /// - `SEARCH_API_KEY_ID` / `SEARCH_API_KEY`: API key pair
    /// - `SEARCH_BASE_URL`: public base URL for pagination links
    /// - `SEARCH_FETCH_BASE_URL`: internal base URL for page fetching
    /// - `SEARCH_LANGUAGE_ANALYZER`: `de=german,en=english` or one analyzer
    /// - `SEARCH_AUTO_INDEX`: index entries on save (default: true)
    /// - `SEARCH_INDEXABLE_SECTIONS` / `SEARCH_UPDATABLE_SECTIONS`: section
    ///   handles, empty or `*` for all
    /// - `SEARCH_FETCH_TIMEOUT_SECS` (default: 30), `SEARCH_REQUEST_TIMEOUT_SECS` (default: 5)
    pub fn from_env() -> Result<Self, SiteSearchError> {
        if dotenv::dotenv().is_ok() {
            debug!("Loaded .env file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SiteSearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let sites = parse_sites(&var("SEARCH_SITES").unwrap_or_else(|| DEFAULT_SITES.to_string()))?;

        let hosts = var("SEARCH_HOSTS")
            .map(|v| parse_list(&v))
            .filter(|hosts| !hosts.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_HOST.to_string()]);

        let mut site_hosts = HashMap::new();
        for site in &sites {
            let key = format!("SEARCH_HOSTS_{}", site.handle.to_ascii_uppercase());
            if let Some(value) = var(&key) {
                site_hosts.insert(site.handle.to_ascii_lowercase(), parse_list(&value));
            }
        }

        let api_key = match (var("SEARCH_API_KEY_ID"), var("SEARCH_API_KEY")) {
            (Some(id), Some(key)) => Some((id, key)),
            _ => None,
        };

        Ok(Self {
            environment: var("SEARCH_ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            sites,
            hosts,
            site_hosts,
            api_key,
            base_url: var("SEARCH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fetch_base_url: var("SEARCH_FETCH_BASE_URL"),
            analyzers: var("SEARCH_LANGUAGE_ANALYZER")
                .map(|v| parse_analyzers(&v))
                .unwrap_or_default(),
            auto_index: var("SEARCH_AUTO_INDEX")
                .map(|v| parse_bool("SEARCH_AUTO_INDEX", &v))
                .transpose()?
                .unwrap_or(true),
            indexable_sections: SectionFilter::parse(&var("SEARCH_INDEXABLE_SECTIONS").unwrap_or_default()),
            updatable_sections: SectionFilter::parse(&var("SEARCH_UPDATABLE_SECTIONS").unwrap_or_default()),
            fetch_timeout: parse_secs(
                "SEARCH_FETCH_TIMEOUT_SECS",
                var("SEARCH_FETCH_TIMEOUT_SECS"),
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?,
            request_timeout: parse_secs(
                "SEARCH_REQUEST_TIMEOUT_SECS",
                var("SEARCH_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        })
    }

    /// Store settings for `site`.
    pub fn store_config(&self, site: &Site) -> StoreConfig {
        let hosts = self
            .site_hosts
            .get(&site.handle.to_ascii_lowercase())
            .filter(|hosts| !hosts.is_empty())
            .unwrap_or(&self.hosts)
            .clone();

        let config = StoreConfig::with_hosts(hosts).with_request_timeout(self.request_timeout);
        match &self.api_key {
            Some((id, key)) => config.with_api_key(id.clone(), key.clone()),
            None => config,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_base_url(self.fetch_base_url.clone())
            .with_timeout(self.fetch_timeout)
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_sites(value: &str) -> Result<Vec<Site>, SiteSearchError> {
    let sites = parse_list(value)
        .iter()
        .map(|triple| {
            let parts: Vec<&str> = triple.split(':').map(str::trim).collect();
            let [id, handle, language] = parts.as_slice() else {
                return Err(SiteSearchError::config(format!(
                    "Invalid site '{}', expected id:handle:language",
                    triple
                )));
            };
            let id = id
                .parse::<u32>()
                .map_err(|e| SiteSearchError::config(format!("Invalid site id '{}': {}", id, e)))?;
            Ok(Site::new(id, *handle, *language))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if sites.is_empty() {
        return Err(SiteSearchError::config("No sites configured"));
    }
    Ok(sites)
}

fn parse_analyzers(value: &str) -> Vec<(Option<String>, String)> {
    parse_list(value)
        .into_iter()
        .map(|item| match item.split_once('=') {
            Some((language, analyzer)) => (Some(language.trim().to_string()), analyzer.trim().to_string()),
            None => (None, item),
        })
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SiteSearchError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SiteSearchError::config(format!("{} must be a boolean, got '{}'", key, value))),
    }
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, SiteSearchError> {
    let secs = match value {
        Some(value) => value
            .parse::<u64>()
            .map_err(|e| SiteSearchError::config(format!("{}: {}", key, e)))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
