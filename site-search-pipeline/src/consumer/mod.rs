//! Reacts to entries being saved in the CMS.
//!
//! Saved entries are turned into index or delete tasks and handed to the
//! external task queue.

use std::sync::Arc;

use site_search_shared::Entry;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::orchestrator::{enqueue_unless_queued, SectionFilter, Task, TaskQueue};

pub struct EntryUpdateHandler {
    queue: Arc<dyn TaskQueue>,
    auto_index: bool,
    indexable: SectionFilter,
    updatable: SectionFilter,
}

impl EntryUpdateHandler {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            queue,
            auto_index: true,
            indexable: SectionFilter::All,
            updatable: SectionFilter::All,
        }
    }

    pub fn with_auto_index(mut self, auto_index: bool) -> Self {
        self.auto_index = auto_index;
        self
    }

    /// Sections whose entries are indexed.
    pub fn with_indexable_sections(mut self, sections: SectionFilter) -> Self {
        self.indexable = sections;
        self
    }

    /// Sections whose entries are re-queued when saved.
    pub fn with_updatable_sections(mut self, sections: SectionFilter) -> Self {
        self.updatable = sections;
        self
    }

    /// The task a save of `entry` calls for, if any.
    pub fn task_for(&self, entry: &Entry) -> Option<Task> {
        if !self.auto_index || entry.is_draft_or_revision || !self.updatable.contains(&entry.section) {
            return None;
        }

        if !entry.enabled || !entry.enabled_for_site {
            return Some(Task::DeleteEntry {
                entry_id: entry.id,
                site_id: entry.site_id,
            });
        }

        self.indexable.contains(&entry.section).then_some(Task::IndexEntry {
            entry_id: entry.id,
            site_id: entry.site_id,
        })
    }

    /// Enqueue the task for a saved entry.
    ///
    /// Returns the task when it was pushed; `None` when nothing had to be
    /// done or an identical task is already waiting.
    #[instrument(skip(self, entry), fields(entry_id = entry.id, site_id = entry.site_id))]
    pub async fn handle(&self, entry: &Entry) -> Result<Option<Task>, PipelineError> {
        let Some(task) = self.task_for(entry) else {
            debug!("Entry does not need indexing");
            return Ok(None);
        };

        let pushed = enqueue_unless_queued(self.queue.as_ref(), task).await?;
        Ok(pushed.then_some(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::task::tests::MockQueue;

    fn handler(queue: Arc<MockQueue>) -> EntryUpdateHandler {
        EntryUpdateHandler::new(queue)
            .with_indexable_sections(SectionFilter::parse("news,pages"))
            .with_updatable_sections(SectionFilter::parse("news,blog"))
    }

    #[tokio::test]
    async fn test_enabled_entry_is_indexed() {
        let queue = Arc::new(MockQueue::default());
        let task = handler(queue.clone())
            .handle(&Entry::new(7, 2, "news"))
            .await
            .unwrap();

        assert_eq!(task, Some(Task::IndexEntry { entry_id: 7, site_id: 2 }));
        assert_eq!(*queue.pushed.lock().unwrap(), vec![Task::IndexEntry { entry_id: 7, site_id: 2 }]);
    }

    #[tokio::test]
    async fn test_disabled_entry_is_deleted() {
        let queue = Arc::new(MockQueue::default());
        let mut entry = Entry::new(7, 2, "news");
        entry.enabled_for_site = false;

        let task = handler(queue).handle(&entry).await.unwrap();
        assert_eq!(task, Some(Task::DeleteEntry { entry_id: 7, site_id: 2 }));
    }

    #[tokio::test]
    async fn test_skipped_entries() {
        let queue = Arc::new(MockQueue::default());
        let handler = handler(queue.clone());

        let mut draft = Entry::new(1, 1, "news");
        draft.is_draft_or_revision = true;
        assert_eq!(handler.handle(&draft).await.unwrap(), None);

        // Updatable but not indexable.
        assert_eq!(handler.handle(&Entry::new(2, 1, "blog")).await.unwrap(), None);
        // Indexable but not updatable.
        assert_eq!(handler.handle(&Entry::new(3, 1, "pages")).await.unwrap(), None);

        let disabled = handler.with_auto_index(false);
        assert_eq!(disabled.handle(&Entry::new(4, 1, "news")).await.unwrap(), None);

        assert!(queue.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queued_task_is_not_pushed_twice() {
        let queue = Arc::new(MockQueue::default());
        let handler = handler(queue.clone());
        let entry = Entry::new(7, 2, "news");

        assert!(handler.handle(&entry).await.unwrap().is_some());
        assert!(handler.handle(&entry).await.unwrap().is_none());
        assert_eq!(queue.pushed.lock().unwrap().len(), 1);
    }
}
