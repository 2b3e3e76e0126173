use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::PipelineError;

/// Work item handed to the external task queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    IndexEntry { entry_id: u64, site_id: u32 },
    DeleteEntry { entry_id: u64, site_id: u32 },
    /// Index every indexable entry and drop documents of entries that are gone.
    IndexSite { site_id: u32 },
    /// Recreate the index from scratch.
    ReindexSite { site_id: u32 },
}

impl Task {
    pub fn site_id(&self) -> u32 {
        match self {
            Self::IndexEntry { site_id, .. }
            | Self::DeleteEntry { site_id, .. }
            | Self::IndexSite { site_id }
            | Self::ReindexSite { site_id } => *site_id,
        }
    }

    /// Key under which the queue deduplicates the task.
    pub fn dedup_key(&self) -> String {
        match self {
            Self::IndexEntry { entry_id, .. } => format!("index-entry-job-{}", entry_id),
            Self::DeleteEntry { entry_id, .. } => format!("delete-entry-job-{}", entry_id),
            Self::IndexSite { site_id } => format!("index-site-job-{}-index", site_id),
            Self::ReindexSite { site_id } => format!("reindex-site-job-{}-reindex", site_id),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::IndexEntry { .. } => 5,
            Self::DeleteEntry { .. } => 1,
            Self::IndexSite { .. } | Self::ReindexSite { .. } => 2,
        }
    }

    /// Whether a task that failed on `attempt` (1-based) may run again.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts()
    }

    /// How long the queue reserves the task for one run.
    pub fn time_to_reserve(&self) -> Duration {
        match self {
            Self::IndexEntry { .. } | Self::DeleteEntry { .. } => Duration::from_secs(60),
            Self::IndexSite { .. } | Self::ReindexSite { .. } => Duration::from_secs(15 * 60),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::IndexEntry { .. } => "Index an entry",
            Self::DeleteEntry { .. } => "Remove an entry from the index",
            Self::IndexSite { .. } => "Index all indexable entries of a site",
            Self::ReindexSite { .. } => "Rebuild the index of a site",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dedup_key())
    }
}

/// External queue the tasks are pushed to.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn is_queued(&self, key: &str) -> Result<bool, PipelineError>;

    async fn push(&self, task: Task) -> Result<(), PipelineError>;
}

/// Push `task` unless a task with the same dedup key is already queued.
/// Returns whether it was pushed.
pub async fn enqueue_unless_queued(queue: &dyn TaskQueue, task: Task) -> Result<bool, PipelineError> {
    if queue.is_queued(&task.dedup_key()).await? {
        debug!(task = %task, "Task already queued");
        return Ok(false);
    }
    queue.push(task).await?;
    debug!(task = %task, "Task queued");
    Ok(true)
}

/// Receives the progress of long running tasks as a fraction in `0..=1`.
pub trait ProgressSink: Send + Sync {
    fn update(&self, fraction: f64);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn update(&self, _fraction: f64) {}
}
