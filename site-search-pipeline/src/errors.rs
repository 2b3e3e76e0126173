//! Error types for the pipeline.

use site_search_index::IndexError;
use site_search_repository::SearchError;
use thiserror::Error;

use crate::fetcher::FetchError;

/// Errors that can occur while assembling, indexing or deleting documents
/// and while running site jobs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Fetching an entry's page failed in a way that must not be ignored.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Entry {entry_id} not found in site {site_id}")]
    EntryNotFound { entry_id: u64, site_id: u32 },

    #[error("Unknown site: {0}")]
    UnknownSite(u32),

    /// The task queue rejected a task.
    #[error("Queue error: {0}")]
    Queue(String),
}

impl PipelineError {
    pub fn entry_not_found(entry_id: u64, site_id: u32) -> Self {
        Self::EntryNotFound { entry_id, site_id }
    }

    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }

    /// Whether the store reported a missing index or document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Index(e) if e.is_not_found())
    }

    /// Whether the external task system may retry the failed task.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Index(e) => e.is_retryable(),
            Self::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        Self::Index(err.into())
    }
}
