//! Lifecycle notifications emitted during a publish.

use crate::types::{ChildPage, RemotePage};

/// Observer of changes applied during a publish run.
///
/// All methods default to no-ops; implement only the events of
/// interest. Events fire after the corresponding remote call
/// succeeded and are informational: control flow never depends
/// on a listener.
pub trait PublishListener {
    /// A page was created.
    fn page_added(&self, _page: &RemotePage) {}

    /// A page was updated in place. Receives the page before and after.
    fn page_updated(&self, _existing: &RemotePage, _updated: &RemotePage) {}

    /// An orphaned page was deleted.
    fn page_deleted(&self, _page: &ChildPage) {}

    /// An attachment was uploaded to a page.
    fn attachment_added(&self, _filename: &str, _content_id: &str) {}

    /// An attachment's data was replaced.
    fn attachment_updated(&self, _filename: &str, _content_id: &str) {}

    /// An attachment was deleted from a page.
    fn attachment_deleted(&self, _filename: &str, _content_id: &str) {}

    /// The whole tree was published successfully. Fires exactly once,
    /// after the last page, even when nothing needed changing.
    fn publish_completed(&self) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl PublishListener for NoopListener {}
