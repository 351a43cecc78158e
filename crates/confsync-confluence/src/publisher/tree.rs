//! Tree walking: publish page subtrees, delete orphaned remote pages.

use super::Reconciler;
use super::error::PublishError;
use super::metadata::PageNode;
use crate::types::ChildPage;

impl Reconciler<'_> {
    /// Publish `nodes` as the children of `parent_id`.
    ///
    /// When orphan deletion is active, remote children of `parent_id`
    /// matching no node by title are deleted first, whole subtrees,
    /// bottom-up. Each node is then reconciled in order: the page
    /// itself, its attachments, its children.
    pub(super) fn publish_under(
        &self,
        parent_id: &str,
        nodes: &[PageNode],
    ) -> Result<(), PublishError> {
        if self.delete_orphans {
            self.delete_orphaned_children(parent_id, nodes)?;
        }

        for node in nodes {
            let content_id = self.add_or_update_page(parent_id, node)?;
            self.reconcile_attachments(&content_id, node)?;
            self.publish_under(&content_id, &node.children)?;
        }

        Ok(())
    }

    /// Publish a single root onto the ancestor page itself.
    ///
    /// The ancestor is updated in place with the root's title and
    /// content; the root's children attach below it.
    pub(super) fn publish_replacing(
        &self,
        ancestor_id: &str,
        root: &PageNode,
    ) -> Result<(), PublishError> {
        self.update_existing_page(ancestor_id, root)?;
        self.reconcile_attachments(ancestor_id, root)?;
        self.publish_under(ancestor_id, &root.children)
    }

    /// Delete remote children of `parent_id` whose titles match no node.
    fn delete_orphaned_children(
        &self,
        parent_id: &str,
        nodes: &[PageNode],
    ) -> Result<(), PublishError> {
        for child in self.api.child_pages(parent_id)? {
            if nodes.iter().any(|n| n.title == child.title) {
                continue;
            }
            self.delete_page_tree(&child)?;
        }
        Ok(())
    }

    /// Delete a page and its whole subtree, children first.
    fn delete_page_tree(&self, page: &ChildPage) -> Result<(), PublishError> {
        for child in self.api.child_pages(&page.id)? {
            self.delete_page_tree(&child)?;
        }
        self.api.delete_page(&page.id)?;
        self.listener.page_deleted(page);
        Ok(())
    }
}
