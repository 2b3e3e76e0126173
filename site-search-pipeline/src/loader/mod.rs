//! Writes documents to and removes them from the store.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};
use site_search_index::{entry_document_id, Document, HookOutcome, Index};
use site_search_repository::{SearchRequest, SearchStore};
use site_search_shared::Entry;
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use crate::processor::EntryDocumentAssembler;

/// Page size of the id enumeration.
pub const SCROLL_PAGE_SIZE: u64 = 250;

/// Keep-alive of the id enumeration cursor.
pub const SCROLL_KEEP_ALIVE: &str = "20s";

/// Outcome of an index operation.
#[derive(Debug)]
pub enum IndexOutcome {
    Indexed(Document),
    Cancelled,
}

impl IndexOutcome {
    /// Id of the indexed document, if any.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            Self::Indexed(document) => Some(document.id()),
            Self::Cancelled => None,
        }
    }
}

/// Outcome of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Indexes and deletes single documents, running the document hooks.
pub struct IndexService {
    assembler: EntryDocumentAssembler,
}

impl IndexService {
    pub fn new(assembler: EntryDocumentAssembler) -> Self {
        Self { assembler }
    }

    /// Assemble and index the document of `entry`.
    #[instrument(skip(self, store, entry, index), fields(entry_id = entry.id, index = %index.name()))]
    pub async fn index_entry(
        &self,
        store: &dyn SearchStore,
        entry: &Entry,
        index: Arc<Index>,
    ) -> Result<IndexOutcome, PipelineError> {
        match self.assembler.assemble(entry, index).await? {
            Some(document) => self.index_document(store, document).await,
            None => Ok(IndexOutcome::Cancelled),
        }
    }

    /// Index an assembled document through the attachment pipeline.
    pub async fn index_document(
        &self,
        store: &dyn SearchStore,
        document: Document,
    ) -> Result<IndexOutcome, PipelineError> {
        let mut request = document.index_request();
        if document.before_index(&mut request)? == HookOutcome::Cancel {
            debug!(document_id = %document.id(), "Indexing cancelled");
            return Ok(IndexOutcome::Cancelled);
        }

        store.index_document(&request).await?;
        info!(document_id = %document.id(), index = %request.index, "Document indexed");

        Ok(IndexOutcome::Indexed(document))
    }

    /// Delete the document of an entry.
    pub async fn delete_entry(
        &self,
        store: &dyn SearchStore,
        entry_id: u64,
        index: Arc<Index>,
    ) -> Result<DeleteOutcome, PipelineError> {
        let document = Document::new(entry_document_id(index.site().id, entry_id), index);
        self.delete_document(store, &document).await
    }

    pub async fn delete_document(
        &self,
        store: &dyn SearchStore,
        document: &Document,
    ) -> Result<DeleteOutcome, PipelineError> {
        if document.before_delete()? == HookOutcome::Cancel {
            debug!(document_id = %document.id(), "Deletion cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        store
            .delete_document(document.index().name(), document.id())
            .await?;
        info!(document_id = %document.id(), "Document deleted");

        Ok(DeleteOutcome::Deleted)
    }

    /// Ids of every document in the index.
    ///
    /// Pages through a scroll cursor until all reported hits are collected
    /// or a page comes back empty.
    #[instrument(skip(self, store, index), fields(index = %index.name()))]
    pub async fn document_ids(
        &self,
        store: &dyn SearchStore,
        index: &Index,
    ) -> Result<HashSet<String>, PipelineError> {
        let request = SearchRequest::new(index.name(), json!({ "query": { "match_all": {} } }))
            .with_size(SCROLL_PAGE_SIZE)
            .with_stored_fields(Vec::<String>::new())
            .with_scroll(SCROLL_KEEP_ALIVE);

        let mut response = store.search(&request).await?;
        let total = response["hits"]["total"]["value"]
            .as_u64()
            .or_else(|| response["hits"]["total"].as_u64())
            .unwrap_or(0);

        let mut ids = HashSet::new();
        let mut page = hit_ids(&response);

        while !page.is_empty() {
            ids.extend(page);
            if ids.len() as u64 >= total {
                break;
            }

            let Some(scroll_id) = response["_scroll_id"].as_str().map(str::to_string) else {
                break;
            };
            response = store.scroll(&scroll_id, SCROLL_KEEP_ALIVE).await?;
            page = hit_ids(&response);
        }

        debug!(count = ids.len(), total, "Collected document ids");
        Ok(ids)
    }
}

fn hit_ids(response: &Value) -> Vec<String> {
    response["hits"]["hits"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|hit| hit["_id"].as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::processor::tests::{index, MockFetcher};
    use async_trait::async_trait;
    use site_search_index::{DocumentHook, IndexBuilder, IndexError};
    use site_search_repository::{IndexDocumentRequest, SearchError};
    use site_search_shared::Site;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// In-memory store keeping indexed documents per index.
    #[derive(Default)]
    pub(crate) struct MockStore {
        pub documents: Mutex<HashMap<String, HashMap<String, IndexDocumentRequest>>>,
        pub deleted: Mutex<Vec<String>>,
        pub created: Mutex<Vec<String>>,
        pub scroll_pages: Mutex<VecDeque<Value>>,
        pub first_page: Mutex<Option<Value>>,
        pub scroll_calls: Mutex<usize>,
        pub missing_index: Mutex<bool>,
    }

    impl MockStore {
        pub(crate) fn with_index(self, name: &str) -> Self {
            self.documents.lock().unwrap().insert(name.to_string(), HashMap::new());
            self
        }

        pub(crate) fn indexed_ids(&self, index: &str) -> Vec<String> {
            let mut ids: Vec<String> = self
                .documents
                .lock()
                .unwrap()
                .get(index)
                .map(|docs| docs.keys().cloned().collect())
                .unwrap_or_default();
            ids.sort();
            ids
        }
    }

    #[async_trait]
    impl SearchStore for MockStore {
        async fn create_index(&self, name: &str, _body: &Value) -> Result<(), SearchError> {
            self.created.lock().unwrap().push(name.to_string());
            self.documents.lock().unwrap().insert(name.to_string(), HashMap::new());
            Ok(())
        }

        async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
            self.documents
                .lock()
                .unwrap()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| SearchError::not_found(name))
        }

        async fn count(&self, name: &str) -> Result<u64, SearchError> {
            self.documents
                .lock()
                .unwrap()
                .get(name)
                .map(|docs| docs.len() as u64)
                .ok_or_else(|| SearchError::not_found(name))
        }

        async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchError> {
            let mut documents = self.documents.lock().unwrap();
            let docs = documents
                .get_mut(&request.index)
                .ok_or_else(|| SearchError::not_found(request.index.clone()))?;
            docs.insert(request.id.clone(), request.clone());
            Ok(())
        }

        async fn get_document(&self, index: &str, id: &str) -> Result<Value, SearchError> {
            self.documents
                .lock()
                .unwrap()
                .get(index)
                .and_then(|docs| docs.get(id))
                .map(|request| Value::Object(request.body.clone()))
                .ok_or_else(|| SearchError::not_found(id))
        }

        async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError> {
            self.deleted.lock().unwrap().push(id.to_string());
            self.documents
                .lock()
                .unwrap()
                .get_mut(index)
                .and_then(|docs| docs.remove(id))
                .map(|_| ())
                .ok_or_else(|| SearchError::not_found(id))
        }

        async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
            if *self.missing_index.lock().unwrap() {
                return Err(SearchError::not_found(request.index.clone()));
            }
            Ok(self.first_page.lock().unwrap().clone().unwrap_or_else(|| {
                json!({ "hits": { "total": { "value": 0 }, "hits": [] } })
            }))
        }

        async fn scroll(&self, _scroll_id: &str, _keep_alive: &str) -> Result<Value, SearchError> {
            *self.scroll_calls.lock().unwrap() += 1;
            Ok(self
                .scroll_pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| json!({ "hits": { "hits": [] } })))
        }

        async fn get_pipeline(&self, id: &str) -> Result<Value, SearchError> {
            Ok(json!({ "id": id }))
        }

        async fn put_pipeline(&self, _id: &str, _body: &Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    pub(crate) fn page(total: u64, ids: &[&str]) -> Value {
        let hits: Vec<Value> = ids.iter().map(|id| json!({ "_id": id })).collect();
        json!({
            "_scroll_id": "cursor",
            "hits": { "total": { "value": total }, "hits": hits }
        })
    }

    struct KeepDrafts;

    impl DocumentHook for KeepDrafts {
        fn before_index(
            &self,
            _document: &Document,
            request: &mut IndexDocumentRequest,
        ) -> Result<HookOutcome, IndexError> {
            request.pipeline = None;
            Ok(HookOutcome::Continue)
        }

        fn before_delete(&self, _document: &Document) -> Result<HookOutcome, IndexError> {
            Ok(HookOutcome::Cancel)
        }
    }

    fn service() -> IndexService {
        IndexService::new(EntryDocumentAssembler::new(Arc::new(MockFetcher::default())))
    }

    fn entry() -> Entry {
        Entry::new(7, 1, "news").with_title("Cat food")
    }

    #[tokio::test]
    async fn test_index_then_get_round_trip() {
        let store = MockStore::default().with_index("test-site-1-default");
        let outcome = service().index_entry(&store, &entry(), index()).await.unwrap();

        let IndexOutcome::Indexed(document) = outcome else {
            panic!("expected an indexed document");
        };
        let stored = store.get_document("test-site-1-default", "1-7").await.unwrap();
        assert_eq!(stored, Value::Object(document.to_body()));
        assert_eq!(stored["title"], "Cat food");
        assert_eq!(stored["noPostDate"], true);

        let requests = store.documents.lock().unwrap();
        assert_eq!(
            requests["test-site-1-default"]["1-7"].pipeline.as_deref(),
            Some("attachment")
        );
    }

    #[tokio::test]
    async fn test_missing_index_is_reported() {
        let store = MockStore::default();
        let err = service().index_entry(&store, &entry(), index()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_hooks_shape_requests_and_cancel_deletes() {
        let store = MockStore::default().with_index("test-site-1-default");
        let mut builder = IndexBuilder::new("test", Site::new(1, "default", "en"));
        builder.document_hook(Arc::new(KeepDrafts));
        let index = Arc::new(builder.build().unwrap());

        service().index_entry(&store, &entry(), index.clone()).await.unwrap();
        assert!(store.documents.lock().unwrap()["test-site-1-default"]["1-7"]
            .pipeline
            .is_none());

        let outcome = service().delete_entry(&store, 7, index).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(store.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let store = MockStore::default().with_index("test-site-1-default");
        service().index_entry(&store, &entry(), index()).await.unwrap();

        let outcome = service().delete_entry(&store, 7, index()).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(store.indexed_ids("test-site-1-default").is_empty());

        let err = service().delete_entry(&store, 7, index()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_document_ids_follow_scroll_cursor() {
        let store = MockStore::default();
        *store.first_page.lock().unwrap() = Some(page(5, &["1-1", "1-2"]));
        store.scroll_pages.lock().unwrap().extend([
            page(5, &["1-3", "1-4"]),
            page(5, &["1-5"]),
            page(5, &["1-6"]),
        ]);

        let ids = service().document_ids(&store, &index()).await.unwrap();

        assert_eq!(ids.len(), 5);
        assert!(ids.contains("1-5"));
        assert_eq!(*store.scroll_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_document_ids_stop_on_empty_page() {
        let store = MockStore::default();
        *store.first_page.lock().unwrap() = Some(page(10, &["1-1"]));

        let ids = service().document_ids(&store, &index()).await.unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(*store.scroll_calls.lock().unwrap(), 1);
    }
}
