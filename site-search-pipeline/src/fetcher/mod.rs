//! Fetching rendered entry pages.

mod http;

pub use http::HttpPageFetcher;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::{Position, Url};

/// Default fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of redirects followed per fetch.
pub const MAX_REDIRECTS: usize = 10;

/// Errors raised while fetching a page.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The host could not be reached or did not answer in time. Usually a
    /// misconfigured base URL.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The page failed to render on the server.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Any other request failure.
    #[error("Request failed: {0}")]
    Request(String),
}

impl FetchError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn server(status: u16, msg: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: msg.into(),
        }
    }

    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Connection failures and server-side rendering failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Server { .. })
    }
}

/// Fetch configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Internal base URL replacing scheme and host of every fetched URL.
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_redirects: MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Replace scheme, host and port of `url` with `base_url`, keeping path
/// and query. Unparseable URLs are returned unchanged.
pub fn rewrite_base_url(url: &str, base_url: Option<&str>) -> String {
    let Some(base_url) = base_url else {
        return url.to_string();
    };

    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            &parsed[Position::BeforePath..]
        ),
        _ => url.to_string(),
    }
}

/// Source of rendered page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
