use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use site_search_index::{Document, Index, IndexLifecycle, IndexRegistry};
use site_search_repository::SearchStore;
use site_search_shared::{Entry, Site};
use tracing::{debug, error, info, instrument, warn};

use super::sites::{SectionFilter, SiteStores};
use super::task::{ProgressSink, Task};
use crate::errors::PipelineError;
use crate::loader::{DeleteOutcome, IndexService};

/// Read access to the CMS entries.
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn entry(&self, entry_id: u64, site_id: u32) -> Result<Option<Entry>, PipelineError>;

    /// Every entry of `site`, drafts and disabled entries included.
    async fn entries(&self, site: &Site) -> Result<Vec<Entry>, PipelineError>;

    /// Enabled, published entries of `site` in the given sections.
    async fn indexable_entries(
        &self,
        site: &Site,
        sections: &SectionFilter,
    ) -> Result<Vec<Entry>, PipelineError> {
        Ok(self
            .entries(site)
            .await?
            .into_iter()
            .filter(|entry| entry.is_live() && sections.contains(&entry.section))
            .collect())
    }
}

/// Counters of a finished task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub indexed: usize,
    pub cancelled: usize,
    pub failed: usize,
    pub deleted: usize,
}

/// Executes [`Task`]s.
pub struct TaskRunner {
    sites: Arc<SiteStores>,
    registry: Arc<IndexRegistry>,
    lifecycle: IndexLifecycle,
    index_service: Arc<IndexService>,
    entries: Arc<dyn EntrySource>,
    sections: SectionFilter,
}

impl TaskRunner {
    pub fn new(
        sites: Arc<SiteStores>,
        registry: Arc<IndexRegistry>,
        index_service: Arc<IndexService>,
        entries: Arc<dyn EntrySource>,
        sections: SectionFilter,
    ) -> Self {
        Self {
            sites,
            registry,
            lifecycle: IndexLifecycle::new(),
            index_service,
            entries,
            sections,
        }
    }

    #[instrument(skip(self, progress), fields(task = %task))]
    pub async fn run(&self, task: Task, progress: &dyn ProgressSink) -> Result<TaskReport, PipelineError> {
        info!(description = task.description(), "Running task");

        let report = match task {
            Task::IndexEntry { entry_id, site_id } => self.index_entry(entry_id, site_id).await?,
            Task::DeleteEntry { entry_id, site_id } => {
                // Fire and forget: the document or the index may already be gone.
                match self.delete_entry(entry_id, site_id).await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!(entry_id, site_id, error = %e, "Failed to delete entry document");
                        TaskReport::default()
                    }
                }
            }
            Task::IndexSite { site_id } => self.index_site(site_id, progress).await?,
            Task::ReindexSite { site_id } => self.reindex_site(site_id, progress).await?,
        };

        info!(
            indexed = report.indexed,
            cancelled = report.cancelled,
            failed = report.failed,
            deleted = report.deleted,
            "Task completed"
        );
        Ok(report)
    }

    fn resolve(&self, site_id: u32) -> Result<(Site, Arc<dyn SearchStore>, Arc<Index>), PipelineError> {
        let (site, store) = self.sites.resolve(site_id)?;
        let index = self.registry.get(site)?;
        Ok((site.clone(), store.clone(), index))
    }

    /// Index one entry, creating the index first if it does not exist yet.
    async fn index_entry(&self, entry_id: u64, site_id: u32) -> Result<TaskReport, PipelineError> {
        let (_, store, index) = self.resolve(site_id)?;
        let entry = self
            .entries
            .entry(entry_id, site_id)
            .await?
            .ok_or_else(|| PipelineError::entry_not_found(entry_id, site_id))?;

        let outcome = match self
            .index_service
            .index_entry(store.as_ref(), &entry, index.clone())
            .await
        {
            Err(e) if e.is_not_found() => {
                warn!(index = %index.name(), "Index missing, creating it");
                self.lifecycle.create(store.as_ref(), &index).await?;
                self.index_service
                    .index_entry(store.as_ref(), &entry, index.clone())
                    .await?
            }
            other => other?,
        };

        let mut report = TaskReport::default();
        match outcome.document_id() {
            Some(_) => report.indexed += 1,
            None => report.cancelled += 1,
        }
        Ok(report)
    }

    async fn delete_entry(&self, entry_id: u64, site_id: u32) -> Result<TaskReport, PipelineError> {
        let (_, store, index) = self.resolve(site_id)?;
        let outcome = self
            .index_service
            .delete_entry(store.as_ref(), entry_id, index)
            .await?;

        Ok(TaskReport {
            deleted: usize::from(outcome == DeleteOutcome::Deleted),
            cancelled: usize::from(outcome == DeleteOutcome::Cancelled),
            ..TaskReport::default()
        })
    }

    /// Index every indexable entry and return the ids of the indexed documents.
    ///
    /// Failing entries are logged and skipped.
    async fn index_entries(
        &self,
        store: &dyn SearchStore,
        site: &Site,
        index: &Arc<Index>,
        progress: &dyn ProgressSink,
        report: &mut TaskReport,
    ) -> Result<HashSet<String>, PipelineError> {
        let entries = self.entries.indexable_entries(site, &self.sections).await?;
        let total = entries.len();
        let mut indexed = HashSet::new();

        info!(site_id = site.id, total, "Indexing entries");

        for (processed, entry) in entries.iter().enumerate() {
            match self.index_service.index_entry(store, entry, index.clone()).await {
                Ok(outcome) => match outcome.document_id() {
                    Some(id) => {
                        indexed.insert(id.to_string());
                        report.indexed += 1;
                    }
                    None => report.cancelled += 1,
                },
                Err(e) => {
                    error!(entry_id = entry.id, error = %e, "Failed to index entry");
                    report.failed += 1;
                }
            }
            progress.update((processed + 1) as f64 / total as f64);
        }

        if total == 0 {
            progress.update(1.0);
        }

        Ok(indexed)
    }

    /// Index all entries of a site and delete documents no longer backed
    /// by an indexable entry.
    async fn index_site(&self, site_id: u32, progress: &dyn ProgressSink) -> Result<TaskReport, PipelineError> {
        let (site, store, index) = self.resolve(site_id)?;
        let store = store.as_ref();

        let existing = match self.index_service.document_ids(store, &index).await {
            Ok(ids) => ids,
            Err(e) if e.is_not_found() => {
                warn!(index = %index.name(), "Index missing, creating it");
                self.lifecycle.create(store, &index).await?;
                HashSet::new()
            }
            Err(e) => return Err(e),
        };

        let mut report = TaskReport::default();
        let indexed = self
            .index_entries(store, &site, &index, progress, &mut report)
            .await?;

        let mut leftovers: Vec<&String> = existing.difference(&indexed).collect();
        leftovers.sort();

        for id in leftovers {
            let document = Document::new(id.clone(), index.clone());
            match self.index_service.delete_document(store, &document).await {
                Ok(DeleteOutcome::Deleted) => report.deleted += 1,
                Ok(DeleteOutcome::Cancelled) => report.cancelled += 1,
                Err(e) if e.is_not_found() => {
                    debug!(document_id = %id, "Document already removed");
                }
                Err(e) => {
                    error!(document_id = %id, error = %e, "Failed to delete leftover document");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Drop and recreate the index, then index all entries.
    async fn reindex_site(&self, site_id: u32, progress: &dyn ProgressSink) -> Result<TaskReport, PipelineError> {
        let (site, store, index) = self.resolve(site_id)?;
        let store = store.as_ref();

        match self.lifecycle.delete(store, &index).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => debug!(index = %index.name(), "Index did not exist"),
            Err(e) => return Err(e.into()),
        }
        self.lifecycle.create(store, &index).await?;

        let mut report = TaskReport::default();
        self.index_entries(store, &site, &index, progress, &mut report)
            .await?;
        Ok(report)
    }
}
