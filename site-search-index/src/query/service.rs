use chrono::Utc;
use serde_json::Value;
use site_search_repository::{SearchRequest, SearchStore};
use site_search_shared::QueryInput;
use tracing::{debug, instrument};

use super::builder::{build_search_query, build_suggest_query};
use crate::errors::IndexError;
use crate::index::Index;
use crate::response::{LinkBuilder, ResponseContext};

/// Runs search and suggest requests against a site's index.
#[derive(Debug, Clone)]
pub struct QueryService {
    links: LinkBuilder,
}

impl QueryService {
    /// `base_url` is the public site URL used for pagination links.
    pub fn new(base_url: &str) -> Result<Self, IndexError> {
        Ok(Self {
            links: LinkBuilder::new(base_url)?,
        })
    }

    fn require_query(input: &QueryInput) -> Result<(), IndexError> {
        match input.query {
            Some(_) => Ok(()),
            None => Err(IndexError::validation("Missing query parameter")),
        }
    }

    /// Full-text search with pagination links.
    #[instrument(skip(self, store, index, input), fields(index = %index.name(), query = ?input.query))]
    pub async fn search(
        &self,
        store: &dyn SearchStore,
        index: &Index,
        input: &QueryInput,
    ) -> Result<Value, IndexError> {
        Self::require_query(input)?;

        let from = input.search_from();
        let size = input.search_size();

        let mut body = build_search_query(input, Utc::now().naive_utc());
        for hook in index.query_hooks() {
            hook.before_search(index, input, &mut body);
        }

        let request = SearchRequest::new(index.name(), body)
            .with_from(from)
            .with_size(size)
            .with_source_includes(index.source_includes().iter().cloned());
        let response = store.search(&request).await?;

        debug!(total = ?response["hits"]["total"], "Search completed");

        let context = ResponseContext {
            input,
            links: &self.links,
            from,
            size,
        };
        index.search_processor().process(&context, &response)
    }

    /// Ranked autocomplete and spelling suggestions.
    #[instrument(skip(self, store, index, input), fields(index = %index.name(), query = ?input.query))]
    pub async fn suggest(
        &self,
        store: &dyn SearchStore,
        index: &Index,
        input: &QueryInput,
    ) -> Result<Value, IndexError> {
        Self::require_query(input)?;

        let mut body = build_suggest_query(input);
        for hook in index.query_hooks() {
            hook.before_suggest(index, input, &mut body);
        }

        let request = SearchRequest::new(index.name(), body).with_size(0);
        let response = store.search(&request).await?;

        let context = ResponseContext {
            input,
            links: &self.links,
            from: 0,
            size: input.suggest_size(),
        };
        index.suggest_processor().process(&context, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::QueryHook;
    use crate::index::tests::test_site;
    use crate::index::IndexBuilder;
    use crate::lifecycle::tests::MockStore;
    use serde_json::json;
    use std::sync::Arc;

    struct BoostNews;

    impl QueryHook for BoostNews {
        fn before_search(&self, _index: &Index, _input: &QueryInput, query: &mut Value) {
            query["query"]["bool"]["should"] = json!([{ "term": { "section": "news" } }]);
        }
    }

    fn service() -> QueryService {
        QueryService::new("https://example.com/").unwrap()
    }

    fn index() -> Index {
        IndexBuilder::new("test", test_site()).build().unwrap()
    }

    #[tokio::test]
    async fn test_missing_query_is_validation_error() {
        let store = MockStore::default();
        let input = QueryInput::default();

        let err = service().search(&store, &index(), &input).await.unwrap_err();
        assert!(matches!(err, IndexError::Validation(_)));
        let err = service().suggest(&store, &index(), &input).await.unwrap_err();
        assert!(matches!(err, IndexError::Validation(_)));
        assert!(store.searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_request() {
        let store = MockStore::default();
        *store.search_response.lock().unwrap() = json!({
            "hits": { "total": { "value": 0 }, "hits": [] }
        });

        let input = QueryInput::new("cat").with_from(-20).with_size(-50);
        let processed = service().search(&store, &index(), &input).await.unwrap();

        let request = store.searches.lock().unwrap()[0].clone();
        assert_eq!(request.index, "test-site-1-default");
        assert_eq!(request.from, Some(20));
        assert_eq!(request.size, Some(50));
        assert_eq!(request.source_includes, vec!["title", "description", "url", "imageUrl"]);
        assert_eq!(processed["data"]["totalHits"], 0);
        assert!(processed["links"].get("last").is_some());
    }

    #[tokio::test]
    async fn test_query_hook_rewrites_body() {
        let store = MockStore::default();
        *store.search_response.lock().unwrap() = json!({
            "hits": { "total": { "value": 0 }, "hits": [] }
        });
        let mut builder = IndexBuilder::new("test", test_site());
        builder.query_hook(Arc::new(BoostNews));
        let index = builder.build().unwrap();

        service()
            .search(&store, &index, &QueryInput::new("cat"))
            .await
            .unwrap();

        let request = store.searches.lock().unwrap()[0].clone();
        assert_eq!(request.body["query"]["bool"]["should"][0]["term"]["section"], "news");
    }

    #[tokio::test]
    async fn test_suggest_request() {
        let store = MockStore::default();
        *store.search_response.lock().unwrap() = json!({
            "suggest": {
                "phrases": [{ "options": [{ "text": "cats", "_score": 1.0 }] }],
                "spelling": [{ "options": [] }]
            }
        });

        let processed = service()
            .suggest(&store, &index(), &QueryInput::new("cat").with_size(3))
            .await
            .unwrap();

        let request = store.searches.lock().unwrap()[0].clone();
        assert_eq!(request.size, Some(0));
        assert_eq!(request.body["suggest"]["phrases"]["completion"]["size"], 3);
        assert_eq!(processed["data"]["suggestions"][0]["text"], "cats");
    }

    #[tokio::test]
    async fn test_malformed_response_is_store_error() {
        let store = MockStore::default();
        *store.search_response.lock().unwrap() = json!({});

        let err = service()
            .search(&store, &index(), &QueryInput::new("cat"))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Store(_)));
    }
}
