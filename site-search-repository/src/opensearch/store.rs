//! OpenSearch store implementation.
//!
//! This module provides the concrete implementation of `SearchStore`
//! using the OpenSearch Rust client.

use std::fmt::Debug;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::response::Response,
    http::transport::{
        ConnectionPool, MultiNodeConnectionPool, SingleNodeConnectionPool, Transport,
        TransportBuilder,
    },
    indices::{IndicesCreateParts, IndicesDeleteParts},
    ingest::{IngestGetPipelineParts, IngestPutPipelineParts},
    CountParts, DeleteParts, GetParts, IndexParts, OpenSearch, ScrollParts, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::StoreConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchStore;
use crate::types::{IndexDocumentRequest, SearchRequest};

/// OpenSearch store implementation.
///
/// # Example
///
/// ```ignore
/// use site_search_repository::{OpenSearchStore, StoreConfig};
///
/// let config = StoreConfig::with_hosts(vec!["http://localhost:9200".to_string()]);
/// let store = OpenSearchStore::new(config)?;
/// let count = store.count("dev-site-1-default").await?;
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
    config: StoreConfig,
}

impl OpenSearchStore {
    /// Create a new OpenSearch store for the configured hosts.
    ///
    /// A single host uses a single-node pool, several hosts are used in
    /// round robin.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchStore)` - A new store instance
    /// * `Err(SearchError)` - If no host is configured, a host is not a valid
    ///   URL or the transport cannot be built
    pub fn new(config: StoreConfig) -> Result<Self, SearchError> {
        let urls = config
            .hosts
            .iter()
            .map(|host| Url::parse(host).map_err(|e| SearchError::connection(format!("{}: {}", host, e))))
            .collect::<Result<Vec<_>, _>>()?;

        let transport = match urls.as_slice() {
            [] => return Err(SearchError::connection("No search hosts configured")),
            [url] => Self::build_transport(SingleNodeConnectionPool::new(url.clone()), &config)?,
            _ => Self::build_transport(MultiNodeConnectionPool::round_robin(urls.clone(), None), &config)?,
        };

        info!(
            hosts = ?config.hosts,
            authenticated = config.api_key.is_some(),
            "Created OpenSearch store"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            config,
        })
    }

    fn build_transport<P>(pool: P, config: &StoreConfig) -> Result<Transport, SearchError>
    where
        P: ConnectionPool + Debug + Clone + Send + 'static,
    {
        let mut builder = TransportBuilder::new(pool)
            .disable_proxy()
            .timeout(config.request_timeout);

        if let Some((id, key)) = &config.api_key {
            builder = builder.auth(Credentials::ApiKey(id.clone(), key.clone()));
        }

        builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))
    }

    /// The configuration this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Map a non-success response onto the error taxonomy.
    ///
    /// 404 becomes `NotFound`, 400 becomes `BadRequest`, anything else is
    /// reported through `fallback`.
    async fn ensure_success(
        response: Response,
        target: &str,
        fallback: fn(String) -> SearchError,
    ) -> Result<Response, SearchError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        let message = format!("{} failed with status {}: {}", target, status, error_body);

        Err(match status.as_u16() {
            404 => SearchError::not_found(message),
            400 => SearchError::bad_request(message),
            _ => {
                error!(status = %status, target = %target, body = %error_body, "Request failed");
                fallback(message)
            }
        })
    }

    async fn json_body(response: Response) -> Result<Value, SearchError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }
}

fn transport_error(e: opensearch::Error) -> SearchError {
    SearchError::connection(e.to_string())
}

#[async_trait]
impl SearchStore for OpenSearchStore {
    #[instrument(skip(self, body))]
    async fn create_index(&self, name: &str, body: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(body.clone())
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response, name, SearchError::IndexError).await?;
        info!(index = %name, "Index created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response, name, SearchError::DeleteError).await?;
        info!(index = %name, "Index deleted");
        Ok(())
    }

    async fn count(&self, name: &str) -> Result<u64, SearchError> {
        let response = self
            .client
            .count(CountParts::Index(&[name]))
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::ensure_success(response, name, SearchError::QueryError).await?;
        let body = Self::json_body(response).await?;

        body["count"]
            .as_u64()
            .ok_or_else(|| SearchError::parse(format!("Missing count in response for {}", name)))
    }

    async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchError> {
        let mut index = self
            .client
            .index(IndexParts::IndexId(&request.index, &request.id))
            .body(Value::Object(request.body.clone()))
            .request_timeout(request.timeout);

        if let Some(pipeline) = &request.pipeline {
            index = index.pipeline(pipeline);
        }

        let response = index.send().await.map_err(transport_error)?;
        Self::ensure_success(response, &request.id, SearchError::IndexError).await?;

        debug!(index = %request.index, doc_id = %request.id, "Document indexed");
        Ok(())
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::ensure_success(response, id, SearchError::QueryError).await?;
        let mut body = Self::json_body(response).await?;

        Ok(body["_source"].take())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .request_timeout(crate::types::DOCUMENT_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response, id, SearchError::DeleteError).await?;

        debug!(index = %index, doc_id = %id, "Document deleted");
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
        let indices = [request.index.as_str()];
        let source_includes: Vec<&str> = request.source_includes.iter().map(String::as_str).collect();
        let stored_fields: Option<Vec<&str>> = request
            .stored_fields
            .as_ref()
            .map(|fields| fields.iter().map(String::as_str).collect());

        let mut search = self
            .client
            .search(SearchParts::Index(&indices))
            .body(request.body.clone());

        if let Some(from) = request.from {
            search = search.from(to_i64("from", from)?);
        }
        if let Some(size) = request.size {
            search = search.size(to_i64("size", size)?);
        }
        if !source_includes.is_empty() {
            search = search._source_includes(&source_includes);
        }
        if let Some(stored_fields) = &stored_fields {
            search = search.stored_fields(stored_fields);
        }
        if let Some(scroll) = &request.scroll {
            search = search.scroll(scroll);
        }

        let response = search.send().await.map_err(transport_error)?;
        let response = Self::ensure_success(response, &request.index, SearchError::QueryError).await?;

        Self::json_body(response).await
    }

    async fn scroll(&self, scroll_id: &str, keep_alive: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .scroll(ScrollParts::None)
            .body(json!({
                "scroll": keep_alive,
                "scroll_id": scroll_id
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::ensure_success(response, "scroll", SearchError::QueryError).await?;
        Self::json_body(response).await
    }

    async fn get_pipeline(&self, id: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .ingest()
            .get_pipeline(IngestGetPipelineParts::Id(id))
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::ensure_success(response, id, SearchError::QueryError).await?;
        Self::json_body(response).await
    }

    #[instrument(skip(self, body))]
    async fn put_pipeline(&self, id: &str, body: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .ingest()
            .put_pipeline(IngestPutPipelineParts::Id(id))
            .body(body.clone())
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response, id, SearchError::IndexError).await?;
        info!(pipeline = %id, "Ingest pipeline stored");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::ensure_success(response, "cluster health", SearchError::QueryError).await?;
        let health = Self::json_body(response).await?;
        let status = health["status"].as_str().unwrap_or("unknown");

        debug!(status = %status, "Cluster health");
        Ok(status == "green" || status == "yellow")
    }
}

fn to_i64(name: &str, value: u64) -> Result<i64, SearchError> {
    i64::try_from(value).map_err(|_| SearchError::bad_request(format!("{} out of range: {}", name, value)))
}
