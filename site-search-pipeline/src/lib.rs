//! # Site Search Pipeline
//!
//! Turns CMS entries into search documents and keeps the per-site indexes
//! in sync with the entries.
//!
//! ## Architecture
//!
//! 1. **Consumer**: turns saved entries into index/delete tasks
//! 2. **Processor**: assembles documents from entries and their fetched pages
//! 3. **Loader**: indexes, deletes and enumerates documents in the store
//! 4. **Orchestrator**: runs entry and site tasks

pub mod consumer;
pub mod errors;
pub mod fetcher;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use consumer::EntryUpdateHandler;
pub use errors::PipelineError;
pub use fetcher::{FetchConfig, FetchError, HttpPageFetcher, PageFetcher};
pub use loader::{DeleteOutcome, IndexOutcome, IndexService};
pub use orchestrator::{
    enqueue_unless_queued, EntrySource, NoopProgress, ProgressSink, SectionFilter, SiteStores,
    Task, TaskQueue, TaskReport, TaskRunner,
};
pub use processor::EntryDocumentAssembler;
