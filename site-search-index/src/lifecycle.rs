//! Index creation and deletion.

use async_trait::async_trait;
use serde_json::{json, Value};
use site_search_repository::{SearchError, SearchStore};
use tracing::{error, info, instrument};

use crate::errors::IndexError;
use crate::hooks::{IndexHook, PreCreateOutcome};
use crate::index::Index;

/// Id of the ingest pipeline extracting page content into `attachment`.
pub const ATTACHMENT_PIPELINE: &str = "attachment";

/// Body of the attachment ingest pipeline.
///
/// Reads the base64 encoded `content`, writes the extracted text to
/// `attachment` and drops `content`.
pub fn attachment_pipeline_body() -> Value {
    json!({
        "description": "Extract indexable text from attached page content",
        "processors": [
            {
                "attachment": {
                    "field": "content",
                    "target_field": "attachment",
                    "indexed_chars": -1,
                    "ignore_missing": true
                }
            },
            {
                "remove": {
                    "field": "content",
                    "ignore_missing": true
                }
            }
        ]
    })
}

/// Default pre-create hook provisioning the attachment pipeline if missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentPipeline;

#[async_trait]
impl IndexHook for AttachmentPipeline {
    async fn before_create(
        &self,
        store: &dyn SearchStore,
        _index: &Index,
    ) -> Result<PreCreateOutcome, IndexError> {
        match store.get_pipeline(ATTACHMENT_PIPELINE).await {
            Ok(_) => {}
            Err(SearchError::NotFound(_)) => {
                info!(pipeline = ATTACHMENT_PIPELINE, "Creating ingest pipeline");
                store
                    .put_pipeline(ATTACHMENT_PIPELINE, &attachment_pipeline_body())
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(PreCreateOutcome::Continue)
    }
}

/// Creates, deletes and counts site indexes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexLifecycle;

impl IndexLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Run the pre-create hooks and create the index.
    ///
    /// Settings or mappings rejected by the store surface as
    /// [`IndexError::Configuration`].
    #[instrument(skip(self, store, index), fields(index = %index.name()))]
    pub async fn create(&self, store: &dyn SearchStore, index: &Index) -> Result<(), IndexError> {
        for hook in index.index_hooks() {
            if hook.before_create(store, index).await? == PreCreateOutcome::Handled {
                break;
            }
        }

        store
            .create_index(index.name(), &index.create_body())
            .await
            .map_err(|e| match e {
                SearchError::BadRequest(msg) => {
                    error!(error = %msg, "Index settings or mappings rejected");
                    IndexError::configuration(msg)
                }
                other => other.into(),
            })?;

        info!("Index created");
        for hook in index.index_hooks() {
            hook.after_create(index).await;
        }

        Ok(())
    }

    /// Delete the index. A missing index is reported as
    /// [`IndexError::NotFound`] for the caller to decide on.
    #[instrument(skip(self, store, index), fields(index = %index.name()))]
    pub async fn delete(&self, store: &dyn SearchStore, index: &Index) -> Result<(), IndexError> {
        store.delete_index(index.name()).await?;

        info!("Index deleted");
        for hook in index.index_hooks() {
            hook.after_delete(index).await;
        }

        Ok(())
    }

    /// Number of documents. A missing index is [`IndexError::NotFound`],
    /// distinct from an empty one.
    pub async fn count(&self, store: &dyn SearchStore, index: &Index) -> Result<u64, IndexError> {
        Ok(store.count(index.name()).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::index::tests::test_site;
    use crate::index::IndexBuilder;
    use site_search_repository::{IndexDocumentRequest, SearchRequest};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory store recording every call.
    #[derive(Default)]
    pub(crate) struct MockStore {
        pub calls: Mutex<Vec<String>>,
        pub pipelines: Mutex<HashMap<String, Value>>,
        pub indexes: Mutex<HashMap<String, Value>>,
        pub create_error: Mutex<Option<SearchError>>,
        pub search_response: Mutex<Value>,
        pub searches: Mutex<Vec<SearchRequest>>,
    }

    impl MockStore {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchStore for MockStore {
        async fn create_index(&self, name: &str, body: &Value) -> Result<(), SearchError> {
            self.record(format!("create_index {}", name));
            if let Some(err) = self.create_error.lock().unwrap().clone() {
                return Err(err);
            }
            self.indexes.lock().unwrap().insert(name.to_string(), body.clone());
            Ok(())
        }

        async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
            self.record(format!("delete_index {}", name));
            self.indexes
                .lock()
                .unwrap()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| SearchError::not_found(name))
        }

        async fn count(&self, name: &str) -> Result<u64, SearchError> {
            if self.indexes.lock().unwrap().contains_key(name) {
                Ok(0)
            } else {
                Err(SearchError::not_found(name))
            }
        }

        async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchError> {
            self.record(format!("index_document {}", request.id));
            Ok(())
        }

        async fn get_document(&self, _index: &str, id: &str) -> Result<Value, SearchError> {
            Err(SearchError::not_found(id))
        }

        async fn delete_document(&self, _index: &str, id: &str) -> Result<(), SearchError> {
            self.record(format!("delete_document {}", id));
            Ok(())
        }

        async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
            self.searches.lock().unwrap().push(request.clone());
            Ok(self.search_response.lock().unwrap().clone())
        }

        async fn scroll(&self, _scroll_id: &str, _keep_alive: &str) -> Result<Value, SearchError> {
            Ok(json!({ "hits": { "hits": [] } }))
        }

        async fn get_pipeline(&self, id: &str) -> Result<Value, SearchError> {
            self.record(format!("get_pipeline {}", id));
            self.pipelines
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| SearchError::not_found(id))
        }

        async fn put_pipeline(&self, id: &str, body: &Value) -> Result<(), SearchError> {
            self.record(format!("put_pipeline {}", id));
            self.pipelines.lock().unwrap().insert(id.to_string(), body.clone());
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    struct Handled {
        after_create: Arc<AtomicBool>,
    }

    #[async_trait]
    impl IndexHook for Handled {
        async fn before_create(
            &self,
            _store: &dyn SearchStore,
            _index: &Index,
        ) -> Result<PreCreateOutcome, IndexError> {
            Ok(PreCreateOutcome::Handled)
        }

        async fn after_create(&self, _index: &Index) {
            self.after_create.store(true, Ordering::SeqCst);
        }
    }

    fn index() -> Index {
        IndexBuilder::new("test", test_site()).build().unwrap()
    }

    #[tokio::test]
    async fn test_create_provisions_pipeline_once() {
        let store = MockStore::default();
        let lifecycle = IndexLifecycle::new();
        let index = index();

        lifecycle.create(&store, &index).await.unwrap();
        store.indexes.lock().unwrap().clear();
        lifecycle.create(&store, &index).await.unwrap();

        let calls = store.calls();
        assert_eq!(
            calls,
            vec![
                "get_pipeline attachment",
                "put_pipeline attachment",
                "create_index test-site-1-default",
                "get_pipeline attachment",
                "create_index test-site-1-default",
            ]
        );

        let pipeline = store.pipelines.lock().unwrap()["attachment"].clone();
        assert_eq!(pipeline["processors"][0]["attachment"]["field"], "content");
        assert_eq!(pipeline["processors"][0]["attachment"]["indexed_chars"], -1);
        assert_eq!(pipeline["processors"][1]["remove"]["field"], "content");
    }

    #[tokio::test]
    async fn test_create_sends_settings_and_mappings() {
        let store = MockStore::default();
        let index = index();
        IndexLifecycle::new().create(&store, &index).await.unwrap();

        let body = store.indexes.lock().unwrap()["test-site-1-default"].clone();
        assert_eq!(body, index.create_body());
        assert!(body["settings"]["analysis"].is_object());
    }

    #[tokio::test]
    async fn test_handled_pre_create_skips_default_pipeline() {
        let store = MockStore::default();
        let after_create = Arc::new(AtomicBool::new(false));
        let mut builder = IndexBuilder::new("test", test_site());
        builder.index_hook(Arc::new(Handled { after_create: after_create.clone() }));
        let index = builder.build().unwrap();

        IndexLifecycle::new().create(&store, &index).await.unwrap();

        assert_eq!(store.calls(), vec!["create_index test-site-1-default"]);
        assert!(after_create.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_rejected_schema_is_configuration_error() {
        let store = MockStore::default();
        *store.create_error.lock().unwrap() = Some(SearchError::bad_request("mapper_parsing_exception"));

        let err = IndexLifecycle::new().create(&store, &index()).await.unwrap_err();
        assert!(matches!(err, IndexError::Configuration(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_failure_is_retryable() {
        let store = MockStore::default();
        *store.create_error.lock().unwrap() = Some(SearchError::connection("timeout"));

        let err = IndexLifecycle::new().create(&store, &index()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_delete_and_count_report_missing_index() {
        let store = MockStore::default();
        let lifecycle = IndexLifecycle::new();
        let index = index();

        assert!(lifecycle.count(&store, &index).await.unwrap_err().is_not_found());
        assert!(lifecycle.delete(&store, &index).await.unwrap_err().is_not_found());

        lifecycle.create(&store, &index).await.unwrap();
        assert_eq!(lifecycle.count(&store, &index).await.unwrap(), 0);
        lifecycle.delete(&store, &index).await.unwrap();
    }
}
