//! Documents conforming to an index schema.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{Map, Value};
use site_search_repository::IndexDocumentRequest;
use site_search_shared::{Entry, DATE_FORMAT};

use crate::errors::IndexError;
use crate::extractor::ContentExtractor;
use crate::hooks::{run_until_cancelled, HookOutcome};
use crate::index::Index;
use crate::lifecycle::ATTACHMENT_PIPELINE;
use crate::schema::fields;

/// Document id of an entry: `{siteId}-{entryId}`.
pub fn entry_document_id(site_id: u32, entry_id: u64) -> String {
    format!("{}-{}", site_id, entry_id)
}

/// One indexable record.
///
/// The property map holds exactly the properties declared by the owning
/// index, all starting out as `null`. Reading or writing any other key
/// fails with [`IndexError::UnknownProperty`].
#[derive(Clone)]
pub struct Document {
    id: String,
    index: Arc<Index>,
    properties: Map<String, Value>,
    extractor: Option<Arc<dyn ContentExtractor>>,
}

impl Document {
    pub fn new(id: impl Into<String>, index: Arc<Index>) -> Self {
        let properties = index
            .properties()
            .iter()
            .map(|(name, _)| (name.clone(), Value::Null))
            .collect();

        Self {
            id: id.into(),
            index,
            properties,
            extractor: None,
        }
    }

    pub fn for_entry(entry: &Entry, index: Arc<Index>) -> Self {
        Self::new(entry_document_id(entry.site_id, entry.id), index)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> &Arc<Index> {
        &self.index
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Result<&Value, IndexError> {
        self.properties
            .get(key)
            .ok_or_else(|| IndexError::unknown_property(key, self.index.name()))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), IndexError> {
        match self.properties.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(IndexError::unknown_property(key, self.index.name())),
        }
    }

    /// Content extractor for this document: the override set by a hook, or
    /// the index default.
    pub fn extractor(&self) -> Arc<dyn ContentExtractor> {
        self.extractor
            .clone()
            .unwrap_or_else(|| self.index.extractor())
    }

    pub fn set_extractor(&mut self, extractor: Arc<dyn ContentExtractor>) {
        self.extractor = Some(extractor);
    }

    /// Set `key` unless a hook already gave it a value.
    fn fill(&mut self, key: &str, value: impl Into<Value>) -> Result<(), IndexError> {
        if self.get(key)?.is_null() {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Fill title, url and the publication window from `entry`, keeping
    /// values set by prepare hooks.
    ///
    /// Missing dates leave the date `null` and set the matching
    /// `no*Date` flag, meaning "no constraint".
    pub fn apply_entry(&mut self, entry: &Entry) -> Result<(), IndexError> {
        self.fill(fields::TITLE, entry.title.clone())?;
        self.fill(fields::URL, entry.url.clone())?;

        let post_date = entry.post_date.map(|date| date.format(DATE_FORMAT).to_string());
        self.fill(fields::NO_POST_DATE, post_date.is_none())?;
        self.fill(fields::POST_DATE, post_date)?;

        let expiry_date = entry
            .expiry_date
            .map(|date| date.format(DATE_FORMAT).to_string());
        self.fill(fields::NO_EXPIRY_DATE, expiry_date.is_none())?;
        self.fill(fields::EXPIRY_DATE, expiry_date)?;

        Ok(())
    }

    /// Hand extracted page text to the attachment pipeline.
    ///
    /// The text is wrapped in a `<div>` and base64 encoded into `content`.
    /// Blank text is not attached.
    pub fn attach_content(&mut self, text: &str) -> Result<(), IndexError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let encoded = BASE64.encode(format!("<div>{}</div>", text));
        self.set(fields::CONTENT, encoded)
    }

    /// Request body: every non-null property.
    pub fn to_body(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Run the index's prepare hooks until one cancels.
    pub fn prepare(&mut self, entry: &Entry) -> Result<HookOutcome, IndexError> {
        let index = self.index.clone();
        run_until_cancelled(index.document_hooks(), |hook| hook.prepare(self, entry))
    }

    /// Run the index's before-index hooks over `request` until one cancels.
    pub fn before_index(&self, request: &mut IndexDocumentRequest) -> Result<HookOutcome, IndexError> {
        run_until_cancelled(self.index.document_hooks(), |hook| hook.before_index(self, request))
    }

    /// Run the index's before-delete hooks until one cancels.
    pub fn before_delete(&self) -> Result<HookOutcome, IndexError> {
        run_until_cancelled(self.index.document_hooks(), |hook| hook.before_delete(self))
    }

    /// Index request routed through the attachment pipeline.
    pub fn index_request(&self) -> IndexDocumentRequest {
        IndexDocumentRequest::new(self.index.name(), self.id.clone(), self.to_body())
            .with_pipeline(ATTACHMENT_PIPELINE)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("index", &self.index.name())
            .field("properties", &self.properties)
            .finish()
    }
}
