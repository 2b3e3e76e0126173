use std::sync::Arc;

use serde_json::Value;
use site_search_index::{Index, IndexLifecycle, IndexRegistry, QueryService};
use site_search_pipeline::{
    enqueue_unless_queued, DeleteOutcome, EntryDocumentAssembler, EntrySource, EntryUpdateHandler,
    IndexOutcome, IndexService, PageFetcher, ProgressSink, SectionFilter, SiteStores, Task,
    TaskQueue, TaskReport, TaskRunner,
};
use site_search_repository::SearchStore;
use site_search_shared::{Entry, QueryInput, Site};
use tracing::{info, instrument, warn};

use crate::SiteSearchError;

/// Indexing behaviour settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSearchOptions {
    /// Queue index/delete tasks when entries are saved.
    pub auto_index: bool,
    pub indexable_sections: SectionFilter,
    pub updatable_sections: SectionFilter,
}

impl Default for SiteSearchOptions {
    fn default() -> Self {
        Self {
            auto_index: true,
            indexable_sections: SectionFilter::All,
            updatable_sections: SectionFilter::All,
        }
    }
}

/// Entry point for the host application.
pub struct SiteSearch {
    sites: Arc<SiteStores>,
    registry: Arc<IndexRegistry>,
    query_service: QueryService,
    lifecycle: IndexLifecycle,
    index_service: Arc<IndexService>,
    queue: Arc<dyn TaskQueue>,
    runner: TaskRunner,
    update_handler: EntryUpdateHandler,
}

impl SiteSearch {
    pub fn new(
        sites: SiteStores,
        registry: IndexRegistry,
        query_service: QueryService,
        fetcher: Arc<dyn PageFetcher>,
        entries: Arc<dyn EntrySource>,
        queue: Arc<dyn TaskQueue>,
        options: SiteSearchOptions,
    ) -> Self {
        let sites = Arc::new(sites);
        let registry = Arc::new(registry);
        let index_service = Arc::new(IndexService::new(EntryDocumentAssembler::new(fetcher)));

        let runner = TaskRunner::new(
            sites.clone(),
            registry.clone(),
            index_service.clone(),
            entries,
            options.indexable_sections.clone(),
        );
        let update_handler = EntryUpdateHandler::new(queue.clone())
            .with_auto_index(options.auto_index)
            .with_indexable_sections(options.indexable_sections)
            .with_updatable_sections(options.updatable_sections);

        Self {
            sites,
            registry,
            query_service,
            lifecycle: IndexLifecycle::new(),
            index_service,
            queue,
            runner,
            update_handler,
        }
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.sites()
    }

    /// The index of a site, built on first access.
    pub fn index(&self, site_id: u32) -> Result<Arc<Index>, SiteSearchError> {
        let site = self.sites.site(site_id)?;
        Ok(self.registry.get(site)?)
    }

    fn resolve(&self, site_id: u32) -> Result<(Arc<dyn SearchStore>, Arc<Index>), SiteSearchError> {
        let store = self.sites.store(site_id)?;
        Ok((store, self.index(site_id)?))
    }

    pub async fn search(&self, site_id: u32, input: &QueryInput) -> Result<Value, SiteSearchError> {
        let (store, index) = self.resolve(site_id)?;
        Ok(self.query_service.search(store.as_ref(), &index, input).await?)
    }

    pub async fn suggest(&self, site_id: u32, input: &QueryInput) -> Result<Value, SiteSearchError> {
        let (store, index) = self.resolve(site_id)?;
        Ok(self.query_service.suggest(store.as_ref(), &index, input).await?)
    }

    #[instrument(skip(self))]
    pub async fn create_index(&self, site_id: u32) -> Result<(), SiteSearchError> {
        let (store, index) = self.resolve(site_id)?;
        self.lifecycle.create(store.as_ref(), &index).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_index(&self, site_id: u32) -> Result<(), SiteSearchError> {
        let (store, index) = self.resolve(site_id)?;
        self.lifecycle.delete(store.as_ref(), &index).await?;
        Ok(())
    }

    pub async fn document_count(&self, site_id: u32) -> Result<u64, SiteSearchError> {
        let (store, index) = self.resolve(site_id)?;
        Ok(self.lifecycle.count(store.as_ref(), &index).await?)
    }

    /// Index one entry right away, bypassing the task queue.
    pub async fn index_entry(&self, entry: &Entry) -> Result<IndexOutcome, SiteSearchError> {
        let (store, index) = self.resolve(entry.site_id)?;
        Ok(self.index_service.index_entry(store.as_ref(), entry, index).await?)
    }

    /// Delete the document of one entry right away.
    pub async fn delete_entry(&self, entry_id: u64, site_id: u32) -> Result<DeleteOutcome, SiteSearchError> {
        let (store, index) = self.resolve(site_id)?;
        Ok(self.index_service.delete_entry(store.as_ref(), entry_id, index).await?)
    }

    /// Execute a task taken off the queue.
    pub async fn run_task(&self, task: Task, progress: &dyn ProgressSink) -> Result<TaskReport, SiteSearchError> {
        Ok(self.runner.run(task, progress).await?)
    }

    /// Queue the task a saved entry calls for.
    pub async fn handle_entry_update(&self, entry: &Entry) -> Result<Option<Task>, SiteSearchError> {
        Ok(self.update_handler.handle(entry).await?)
    }

    /// Queue an index task, or a reindex task with `reindex` set, for every
    /// site. Returns the tasks that were pushed.
    #[instrument(skip(self))]
    pub async fn enqueue_all_sites(&self, reindex: bool) -> Result<Vec<Task>, SiteSearchError> {
        let mut pushed = Vec::new();
        for site in self.sites.sites() {
            let task = if reindex {
                Task::ReindexSite { site_id: site.id }
            } else {
                Task::IndexSite { site_id: site.id }
            };
            if enqueue_unless_queued(self.queue.as_ref(), task).await? {
                pushed.push(task);
            }
        }

        info!(pushed = pushed.len(), "Queued site tasks");
        Ok(pushed)
    }

    /// Whether the store of every site is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, SiteSearchError> {
        for (site, store) in self.sites.iter() {
            if !store.health_check().await? {
                warn!(site = %site.handle, "Search store is unhealthy");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use site_search_pipeline::{FetchError, NoopProgress, PipelineError};
    use site_search_repository::{IndexDocumentRequest, SearchError, SearchRequest};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    const INDEX: &str = "test-site-1-default";

    #[derive(Default)]
    struct MemoryStore {
        indexes: Mutex<HashMap<String, HashMap<String, IndexDocumentRequest>>>,
        searches: Mutex<Vec<SearchRequest>>,
        search_response: Mutex<Option<Value>>,
        healthy: bool,
    }

    #[async_trait]
    impl SearchStore for MemoryStore {
        async fn create_index(&self, name: &str, _body: &Value) -> Result<(), SearchError> {
            self.indexes.lock().unwrap().insert(name.to_string(), HashMap::new());
            Ok(())
        }

        async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
            self.indexes
                .lock()
                .unwrap()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| SearchError::not_found(name))
        }

        async fn count(&self, name: &str) -> Result<u64, SearchError> {
            self.indexes
                .lock()
                .unwrap()
                .get(name)
                .map(|docs| docs.len() as u64)
                .ok_or_else(|| SearchError::not_found(name))
        }

        async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchError> {
            self.indexes
                .lock()
                .unwrap()
                .get_mut(&request.index)
                .ok_or_else(|| SearchError::not_found(request.index.clone()))?
                .insert(request.id.clone(), request.clone());
            Ok(())
        }

        async fn get_document(&self, index: &str, id: &str) -> Result<Value, SearchError> {
            self.indexes
                .lock()
                .unwrap()
                .get(index)
                .and_then(|docs| docs.get(id))
                .map(|request| Value::Object(request.body.clone()))
                .ok_or_else(|| SearchError::not_found(id))
        }

        async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError> {
            self.indexes
                .lock()
                .unwrap()
                .get_mut(index)
                .and_then(|docs| docs.remove(id))
                .map(|_| ())
                .ok_or_else(|| SearchError::not_found(id))
        }

        async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
            self.searches.lock().unwrap().push(request.clone());
            Ok(self
                .search_response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| json!({ "hits": { "total": { "value": 0 }, "hits": [] } })))
        }

        async fn scroll(&self, _scroll_id: &str, _keep_alive: &str) -> Result<Value, SearchError> {
            Ok(json!({ "hits": { "hits": [] } }))
        }

        async fn get_pipeline(&self, id: &str) -> Result<Value, SearchError> {
            Ok(json!({ "id": id }))
        }

        async fn put_pipeline(&self, _id: &str, _body: &Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(self.healthy)
        }
    }

    struct NoPages;

    #[async_trait]
    impl PageFetcher for NoPages {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::request(format!("unexpected fetch of {}", url)))
        }
    }

    struct Entries(Vec<Entry>);

    #[async_trait]
    impl EntrySource for Entries {
        async fn entry(&self, entry_id: u64, site_id: u32) -> Result<Option<Entry>, PipelineError> {
            Ok(self
                .0
                .iter()
                .find(|entry| entry.id == entry_id && entry.site_id == site_id)
                .cloned())
        }

        async fn entries(&self, site: &Site) -> Result<Vec<Entry>, PipelineError> {
            Ok(self.0.iter().filter(|entry| entry.site_id == site.id).cloned().collect())
        }
    }

    #[derive(Default)]
    struct Queue {
        queued: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl TaskQueue for Queue {
        async fn is_queued(&self, key: &str) -> Result<bool, PipelineError> {
            Ok(self.queued.lock().unwrap().contains(key))
        }

        async fn push(&self, task: Task) -> Result<(), PipelineError> {
            self.queued.lock().unwrap().insert(task.dedup_key());
            Ok(())
        }
    }

    fn site_search(store: Arc<MemoryStore>) -> SiteSearch {
        let sites = SiteStores::new().with_site(Site::new(1, "default", "en"), store);
        SiteSearch::new(
            sites,
            IndexRegistry::new("test"),
            QueryService::new("https://example.com/").unwrap(),
            Arc::new(NoPages),
            Arc::new(Entries(vec![
                Entry::new(1, 1, "news").with_title("Hello"),
                Entry::new(2, 1, "news").with_title("World"),
            ])),
            Arc::new(Queue::default()),
            SiteSearchOptions::default(),
        )
    }

    fn healthy_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore {
            healthy: true,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_index_lifecycle() {
        let store = healthy_store();
        let search = site_search(store.clone());

        search.create_index(1).await.unwrap();
        assert_eq!(search.document_count(1).await.unwrap(), 0);

        let outcome = search
            .index_entry(&Entry::new(1, 1, "news").with_title("Hello"))
            .await
            .unwrap();
        assert_eq!(outcome.document_id(), Some("1-1"));
        assert_eq!(search.document_count(1).await.unwrap(), 1);

        assert_eq!(search.delete_entry(1, 1).await.unwrap(), DeleteOutcome::Deleted);
        search.delete_index(1).await.unwrap();
        assert!(search.document_count(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let search = site_search(healthy_store());
        let err = search.search(7, &QueryInput::new("hello")).await.unwrap_err();
        assert_eq!(err, SiteSearchError::UnknownSite(7));
    }

    #[tokio::test]
    async fn test_search_uses_site_index() {
        let store = healthy_store();
        *store.search_response.lock().unwrap() = Some(json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [{ "_id": "1-1", "_score": 1.5, "_source": { "title": "Hello" } }]
            }
        }));
        let search = site_search(store.clone());

        let response = search.search(1, &QueryInput::new("hello")).await.unwrap();

        assert_eq!(response["data"]["totalHits"], 1);
        assert_eq!(store.searches.lock().unwrap()[0].index, INDEX);
    }

    #[tokio::test]
    async fn test_run_task_and_enqueue() {
        let store = healthy_store();
        let search = site_search(store.clone());

        let report = search
            .run_task(Task::ReindexSite { site_id: 1 }, &NoopProgress)
            .await
            .unwrap();
        assert_eq!(report.indexed, 2);
        assert_eq!(search.document_count(1).await.unwrap(), 2);

        assert_eq!(
            search.enqueue_all_sites(false).await.unwrap(),
            vec![Task::IndexSite { site_id: 1 }]
        );
        assert!(search.enqueue_all_sites(false).await.unwrap().is_empty());

        let task = search
            .handle_entry_update(&Entry::new(3, 1, "news"))
            .await
            .unwrap();
        assert_eq!(task, Some(Task::IndexEntry { entry_id: 3, site_id: 1 }));
    }

    #[tokio::test]
    async fn test_health_check() {
        assert!(site_search(healthy_store()).health_check().await.unwrap());
        assert!(!site_search(Arc::new(MemoryStore::default())).health_check().await.unwrap());
    }
}
