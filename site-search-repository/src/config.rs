//! Configuration types for the search store.

use std::time::Duration;

/// Default host used when none is configured.
pub const DEFAULT_HOST: &str = "http://localhost:9200";

/// Configuration for connecting to the search store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Hosts the store connects to, in round robin when there are several.
    pub hosts: Vec<String>,
    /// Optional API key pair `(id, key)`.
    pub api_key: Option<(String, String)>,
    /// Timeout applied to every request sent to the store.
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hosts: vec![DEFAULT_HOST.to_string()],
            api_key: None,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Create a config for the given hosts with default timeouts.
    pub fn with_hosts(hosts: Vec<String>) -> Self {
        Self {
            hosts,
            ..Default::default()
        }
    }

    /// Use an API key pair. Empty ids or keys leave authentication disabled.
    pub fn with_api_key(mut self, id: impl Into<String>, key: impl Into<String>) -> Self {
        let (id, key) = (id.into(), key.into());
        self.api_key = if id.is_empty() || key.is_empty() {
            None
        } else {
            Some((id, key))
        };
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
