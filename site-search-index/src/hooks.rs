//! Extension points fired around document, query and index operations.
//!
//! Hooks are registered on an [`IndexBuilder`](crate::IndexBuilder) and run
//! in registration order.

use async_trait::async_trait;
use serde_json::Value;
use site_search_repository::{IndexDocumentRequest, SearchStore};
use site_search_shared::{Entry, QueryInput};

use crate::document::Document;
use crate::errors::IndexError;
use crate::index::Index;

/// Result of a hook that may veto the surrounding operation.
///
/// Cancelling is not a failure: the operation is skipped and reported as
/// cancelled to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookOutcome {
    #[default]
    Continue,
    Cancel,
}

impl HookOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancel)
    }
}

/// Result of a pre-create hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreCreateOutcome {
    #[default]
    Continue,
    /// The hook took care of the preparation; later pre-create hooks are skipped.
    Handled,
}

/// Hooks around indexing and deleting a single document.
pub trait DocumentHook: Send + Sync {
    /// Called before the entry-derived properties are filled in.
    ///
    /// May set properties or override the document's content extractor.
    fn prepare(&self, _document: &mut Document, _entry: &Entry) -> Result<HookOutcome, IndexError> {
        Ok(HookOutcome::Continue)
    }

    /// Called with the final index request (pipeline and body).
    fn before_index(
        &self,
        _document: &Document,
        _request: &mut IndexDocumentRequest,
    ) -> Result<HookOutcome, IndexError> {
        Ok(HookOutcome::Continue)
    }

    fn before_delete(&self, _document: &Document) -> Result<HookOutcome, IndexError> {
        Ok(HookOutcome::Continue)
    }
}

/// Hooks that may rewrite the engine query before it is sent.
pub trait QueryHook: Send + Sync {
    fn before_search(&self, _index: &Index, _input: &QueryInput, _query: &mut Value) {}

    fn before_suggest(&self, _index: &Index, _input: &QueryInput, _query: &mut Value) {}
}

/// Hooks around creating and deleting the index itself.
#[async_trait]
pub trait IndexHook: Send + Sync {
    async fn before_create(
        &self,
        _store: &dyn SearchStore,
        _index: &Index,
    ) -> Result<PreCreateOutcome, IndexError> {
        Ok(PreCreateOutcome::Continue)
    }

    async fn after_create(&self, _index: &Index) {}

    async fn after_delete(&self, _index: &Index) {}
}

/// Run `hook` over `hooks` until the first cancellation.
pub(crate) fn run_until_cancelled<H: ?Sized, F>(
    hooks: &[std::sync::Arc<H>],
    mut hook: F,
) -> Result<HookOutcome, IndexError>
where
    F: FnMut(&H) -> Result<HookOutcome, IndexError>,
{
    for h in hooks {
        if hook(h.as_ref())?.is_cancelled() {
            return Ok(HookOutcome::Cancel);
        }
    }
    Ok(HookOutcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: Arc<AtomicUsize>,
        outcome: HookOutcome,
    }

    impl DocumentHook for Counting {
        fn before_delete(&self, _document: &Document) -> Result<HookOutcome, IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome)
        }
    }

    #[test]
    fn test_first_cancellation_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hooks: Vec<Arc<dyn DocumentHook>> = vec![
            Arc::new(Counting { calls: calls.clone(), outcome: HookOutcome::Continue }),
            Arc::new(Counting { calls: calls.clone(), outcome: HookOutcome::Cancel }),
            Arc::new(Counting { calls: calls.clone(), outcome: HookOutcome::Continue }),
        ];

        let index = Arc::new(crate::index::tests::test_index());
        let document = Document::new("1-1", index);
        let outcome = run_until_cancelled(&hooks, |hook| hook.before_delete(&document)).unwrap();

        assert_eq!(outcome, HookOutcome::Cancel);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_all_continue() {
        let hooks: Vec<Arc<dyn DocumentHook>> = Vec::new();
        let index = Arc::new(crate::index::tests::test_index());
        let document = Document::new("1-1", index);

        let outcome = run_until_cancelled(&hooks, |hook| hook.before_delete(&document)).unwrap();
        assert_eq!(outcome, HookOutcome::Continue);
    }
}
