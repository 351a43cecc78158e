//! Remote API surface consumed by the publisher.

use crate::error::ConfluenceError;
use crate::types::{ChildPage, RemoteAttachment, RemotePage};

/// Operations the publisher needs from a Confluence backend.
///
/// The three lookup methods return `Ok(None)` when the resource does not
/// exist; the publisher branches on that to create instead of update.
/// Every other failure surfaces as a [`ConfluenceError`] and aborts the
/// publish.
///
/// Implemented by [`ConfluenceClient`](crate::ConfluenceClient) for real
/// servers and by [`MockConfluence`](crate::MockConfluence) for tests.
pub trait ConfluenceApi {
    /// Find a page ID by title within a space.
    ///
    /// Titles are unique per space in Confluence, so the lookup is
    /// space-scoped rather than scoped to a parent page.
    fn page_id_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<String>, ConfluenceError>;

    /// Fetch a page with its storage body and version.
    fn page_by_id(&self, content_id: &str) -> Result<RemotePage, ConfluenceError>;

    /// Create a page under an ancestor. Returns the new content ID.
    fn add_page(
        &self,
        space_key: &str,
        ancestor_id: &str,
        title: &str,
        content: &str,
        version_message: Option<&str>,
    ) -> Result<String, ConfluenceError>;

    /// Update a page in place.
    ///
    /// `version` is the number the page is updated *to* (current + 1).
    /// When `parent_id` is given it is written to the page's ancestors;
    /// when absent the page keeps its current position.
    fn update_page(
        &self,
        content_id: &str,
        parent_id: Option<&str>,
        title: &str,
        content: &str,
        version: u32,
        version_message: Option<&str>,
    ) -> Result<(), ConfluenceError>;

    /// Delete a page.
    fn delete_page(&self, content_id: &str) -> Result<(), ConfluenceError>;

    /// List direct child pages.
    fn child_pages(&self, content_id: &str) -> Result<Vec<ChildPage>, ConfluenceError>;

    /// List attachments on a page.
    fn attachments(&self, content_id: &str) -> Result<Vec<RemoteAttachment>, ConfluenceError>;

    /// Find an attachment on a page by filename.
    fn attachment_by_filename(
        &self,
        content_id: &str,
        filename: &str,
    ) -> Result<Option<RemoteAttachment>, ConfluenceError>;

    /// Upload a new attachment. Returns the attachment ID.
    fn add_attachment(
        &self,
        content_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<String, ConfluenceError>;

    /// Replace the binary data of an existing attachment.
    ///
    /// `filename` names the file part of the multipart upload; the
    /// attachment itself is addressed by `attachment_id`.
    fn update_attachment(
        &self,
        content_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), ConfluenceError>;

    /// Delete an attachment.
    fn delete_attachment(&self, attachment_id: &str) -> Result<(), ConfluenceError>;

    /// Read a content property value by key.
    fn property_by_key(
        &self,
        content_id: &str,
        key: &str,
    ) -> Result<Option<String>, ConfluenceError>;

    /// Create a content property.
    fn set_property(
        &self,
        content_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfluenceError>;

    /// Delete a content property. Deleting an absent property succeeds.
    fn delete_property(&self, content_id: &str, key: &str) -> Result<(), ConfluenceError>;
}
