//! Assembles index documents from CMS entries.

use std::sync::Arc;

use site_search_index::{Document, HookOutcome, Index};
use site_search_shared::Entry;
use tracing::{debug, error, instrument};

use crate::errors::PipelineError;
use crate::fetcher::{FetchError, PageFetcher};

/// Turns an entry plus its rendered page into a [`Document`].
pub struct EntryDocumentAssembler {
    fetcher: Arc<dyn PageFetcher>,
}

impl EntryDocumentAssembler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Build the document of `entry` in `index`.
    ///
    /// Returns `None` when a prepare hook cancels. Connection and request
    /// failures while fetching the page abort, a page failing to render
    /// is logged and indexed without content.
    #[instrument(skip(self, entry, index), fields(entry_id = entry.id, site_id = entry.site_id))]
    pub async fn assemble(
        &self,
        entry: &Entry,
        index: Arc<Index>,
    ) -> Result<Option<Document>, PipelineError> {
        let mut document = Document::for_entry(entry, index);

        if document.prepare(entry)? == HookOutcome::Cancel {
            debug!(document_id = %document.id(), "Document preparation cancelled");
            return Ok(None);
        }

        document.apply_entry(entry)?;

        let Some(url) = entry.url.as_deref() else {
            return Ok(Some(document));
        };

        let markup = match self.fetcher.fetch(url).await {
            Ok(markup) => markup,
            Err(FetchError::Server { status, message }) => {
                error!(url, status, error = %message, "Server error, indexing without page content");
                return Ok(Some(document));
            }
            Err(e @ FetchError::Connection(_)) => {
                error!(
                    url,
                    error = %e,
                    "Could not connect to host. Consider configuring a fetch base URL"
                );
                return Err(e.into());
            }
            Err(e) => {
                error!(url, error = %e, "Cannot fetch page");
                return Err(e.into());
            }
        };

        let content = document.extractor().extract(&markup).inspect_err(|e| {
            error!(url, error = %e, "Cannot extract indexable markup");
        })?;
        document.attach_content(content.trim())?;

        Ok(Some(document))
    }
}
