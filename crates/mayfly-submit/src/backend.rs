//! Cluster client seam
//!
//! This module defines the trait the submit loop drives. The production
//! implementation talks to a live cluster; tests script one in memory.

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use mayfly_crd::Workflow;

/// One change notification delivered by a workflow watch.
///
/// Watch streams are heterogeneous: besides workflow changes they carry
/// bookmarks and, in principle, payloads of foreign kinds. Modeling that
/// as a union keeps the "skip what is not a workflow" decision an
/// exhaustive match instead of a runtime cast.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// A workflow matching the watch filter changed
    Workflow(Workflow),
    /// Bookmark or foreign payload; carries no workflow state
    Unrelated,
}

/// Lazy, possibly infinite, non-restartable sequence of change events.
///
/// Dropping the stream releases the server-side watch, so every exit
/// path of a consuming loop closes it.
pub type EventStream = BoxStream<'static, Result<ResourceEvent>>;

/// Trait for creating workflow resources and watching them by name
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Create the workflow resource remotely, returning it as echoed by
    /// the server (name populated even when generated from a prefix)
    async fn create(&self, workflow: &Workflow) -> Result<Workflow>;

    /// Open a change-event stream filtered to exactly the named
    /// workflow (field selector, not a prefix match)
    async fn watch(&self, name: &str) -> Result<EventStream>;
}
