//! Site jobs: the task model and the runner executing tasks.

mod runner;
mod sites;
pub(crate) mod task;

pub use runner::{EntrySource, TaskReport, TaskRunner};
pub use sites::{SectionFilter, SiteStores};
pub use task::{enqueue_unless_queued, NoopProgress, ProgressSink, Task, TaskQueue};
