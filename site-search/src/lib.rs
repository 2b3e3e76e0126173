//! # Site Search
//!
//! Entry point of the site search indexer.
//!
//! This crate loads the configuration, wires one search store per site
//! and exposes the [`SiteSearch`] facade used by the host application to
//! search, suggest, manage indexes and run indexing tasks.

pub mod config;
pub mod logging;
mod site_search;

pub use config::{Dependencies, SiteSearchConfig};
pub use logging::init_tracing;
pub use site_search::{SiteSearch, SiteSearchOptions};

use site_search_index::IndexError;
use site_search_pipeline::PipelineError;
use site_search_repository::SearchError;
use thiserror::Error;

/// Errors surfaced by the facade and by initialization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteSearchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No site with this id is configured.
    #[error("Unknown site: {0}")]
    UnknownSite(u32),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Pipeline(PipelineError),
}

impl SiteSearchError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Index(e) => e.is_not_found(),
            Self::Pipeline(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Whether a failed task may be retried by the task system.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Index(e) => e.is_retryable(),
            Self::Pipeline(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<PipelineError> for SiteSearchError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::UnknownSite(site_id) => Self::UnknownSite(site_id),
            PipelineError::Index(e) => Self::Index(e),
            other => Self::Pipeline(other),
        }
    }
}

impl From<SearchError> for SiteSearchError {
    fn from(err: SearchError) -> Self {
        Self::Index(err.into())
    }
}
