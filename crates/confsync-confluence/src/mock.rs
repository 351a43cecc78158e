//! Mock Confluence backend for testing.
//!
//! Provides [`MockConfluence`] for unit testing the publish workflow
//! without a server.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{ChildPage, RemoteAttachment, RemotePage};

#[derive(Debug, Clone)]
struct StoredPage {
    id: String,
    space_key: String,
    title: String,
    content: String,
    version: u32,
    parent: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredAttachment {
    id: String,
    page_id: String,
    title: String,
    data: Vec<u8>,
}

/// Mock Confluence backend for testing.
///
/// Stores pages, attachments and content properties in memory. Use the
/// builder methods to seed remote state, then inspect it after a publish.
/// Every mutating call is recorded in an ordered log so tests can assert
/// both what changed and that nothing did.
///
/// # Example
///
/// ```ignore
/// use confsync_confluence::{ConfluenceApi, MockConfluence};
///
/// let remote = MockConfluence::new()
///     .with_page("100", "DOCS", "Home", "<p>welcome</p>");
///
/// let id = remote.page_id_by_title("DOCS", "Home").unwrap();
/// assert_eq!(id.as_deref(), Some("100"));
/// ```
#[derive(Debug)]
pub struct MockConfluence {
    pages: RwLock<Vec<StoredPage>>,
    attachments: RwLock<Vec<StoredAttachment>>,
    properties: RwLock<BTreeMap<(String, String), String>>,
    mutations: RwLock<Vec<String>>,
    next_id: RwLock<u64>,
    fail_on: RwLock<Option<String>>,
}

impl Default for MockConfluence {
    fn default() -> Self {
        Self {
            pages: RwLock::new(Vec::new()),
            attachments: RwLock::new(Vec::new()),
            properties: RwLock::new(BTreeMap::new()),
            mutations: RwLock::new(Vec::new()),
            next_id: RwLock::new(1000),
            fail_on: RwLock::new(None),
        }
    }
}

impl MockConfluence {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page without a parent (an anchor page).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        id: impl Into<String>,
        space_key: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.pages.write().unwrap().push(StoredPage {
            id: id.into(),
            space_key: space_key.into(),
            title: title.into(),
            content: content.into(),
            version: 1,
            parent: None,
        });
        self
    }

    /// Seed a page under a parent page.
    ///
    /// The parent must have been seeded first; the space key is inherited.
    ///
    /// # Panics
    ///
    /// Panics if the parent is unknown or the internal lock is poisoned.
    #[must_use]
    pub fn with_child_page(
        self,
        parent_id: &str,
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let space_key = {
            let pages = self.pages.read().unwrap();
            pages
                .iter()
                .find(|p| p.id == parent_id)
                .map(|p| p.space_key.clone())
                .expect("unknown parent page")
        };
        self.pages.write().unwrap().push(StoredPage {
            id: id.into(),
            space_key,
            title: title.into(),
            content: content.into(),
            version: 1,
            parent: Some(parent_id.to_owned()),
        });
        self
    }

    /// Seed a content property.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_property(
        self,
        content_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.properties
            .write()
            .unwrap()
            .insert((content_id.into(), key.into()), value.into());
        self
    }

    /// Seed an attachment on a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attachment(
        self,
        page_id: impl Into<String>,
        id: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.attachments.write().unwrap().push(StoredAttachment {
            id: id.into(),
            page_id: page_id.into(),
            title: filename.into(),
            data: data.into(),
        });
        self
    }

    /// Make the named API method fail with an injected server error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure_on(self, method: impl Into<String>) -> Self {
        *self.fail_on.write().unwrap() = Some(method.into());
        self
    }

    /// Ordered log of mutating calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn mutations(&self) -> Vec<String> {
        self.mutations.read().unwrap().clone()
    }

    /// Clear the mutation log (typically between two publish runs).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_mutations(&self) {
        self.mutations.write().unwrap().clear();
    }

    /// Number of pages currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }

    /// Find a page ID by title across all spaces.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_id(&self, title: &str) -> Option<String> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.title == title)
            .map(|p| p.id.clone())
    }

    /// Current version of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_version(&self, content_id: &str) -> Option<u32> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == content_id)
            .map(|p| p.version)
    }

    /// Current storage body of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_content(&self, content_id: &str) -> Option<String> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == content_id)
            .map(|p| p.content.clone())
    }

    /// Titles of direct children of a page, in storage order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn child_titles(&self, parent_id: &str) -> Vec<String> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.parent.as_deref() == Some(parent_id))
            .map(|p| p.title.clone())
            .collect()
    }

    /// Filenames attached to a page, in storage order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachment_titles(&self, page_id: &str) -> Vec<String> {
        self.attachments
            .read()
            .unwrap()
            .iter()
            .filter(|a| a.page_id == page_id)
            .map(|a| a.title.clone())
            .collect()
    }

    /// Stored data of an attachment.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachment_data(&self, attachment_id: &str) -> Option<Vec<u8>> {
        self.attachments
            .read()
            .unwrap()
            .iter()
            .find(|a| a.id == attachment_id)
            .map(|a| a.data.clone())
    }

    /// Read a property directly, bypassing the API surface.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn property(&self, content_id: &str, key: &str) -> Option<String> {
        self.properties
            .read()
            .unwrap()
            .get(&(content_id.to_owned(), key.to_owned()))
            .cloned()
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.write().unwrap();
        *next += 1;
        next.to_string()
    }

    fn record(&self, entry: String) {
        self.mutations.write().unwrap().push(entry);
    }

    fn fail_if_armed(&self, method: &str) -> Result<(), ConfluenceError> {
        if self.fail_on.read().unwrap().as_deref() == Some(method) {
            return Err(ConfluenceError::HttpResponse {
                status: 500,
                body: format!("injected failure in {method}"),
            });
        }
        Ok(())
    }

    fn not_found(what: &str, id: &str) -> ConfluenceError {
        ConfluenceError::HttpResponse {
            status: 404,
            body: format!("no {what} with id {id}"),
        }
    }
}

impl ConfluenceApi for MockConfluence {
    fn page_id_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<String>, ConfluenceError> {
        self.fail_if_armed("page_id_by_title")?;
        Ok(self
            .pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.space_key == space_key && p.title == title)
            .map(|p| p.id.clone()))
    }

    fn page_by_id(&self, content_id: &str) -> Result<RemotePage, ConfluenceError> {
        self.fail_if_armed("page_by_id")?;
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == content_id)
            .map(|p| RemotePage {
                id: p.id.clone(),
                title: p.title.clone(),
                content: p.content.clone(),
                version: p.version,
            })
            .ok_or_else(|| Self::not_found("page", content_id))
    }

    fn add_page(
        &self,
        space_key: &str,
        ancestor_id: &str,
        title: &str,
        content: &str,
        _version_message: Option<&str>,
    ) -> Result<String, ConfluenceError> {
        self.fail_if_armed("add_page")?;
        let mut pages = self.pages.write().unwrap();
        if !pages.iter().any(|p| p.id == ancestor_id) {
            return Err(Self::not_found("ancestor", ancestor_id));
        }
        let id = self.allocate_id();
        pages.push(StoredPage {
            id: id.clone(),
            space_key: space_key.to_owned(),
            title: title.to_owned(),
            content: content.to_owned(),
            version: 1,
            parent: Some(ancestor_id.to_owned()),
        });
        drop(pages);
        self.record(format!("add_page {title}"));
        Ok(id)
    }

    fn update_page(
        &self,
        content_id: &str,
        parent_id: Option<&str>,
        title: &str,
        content: &str,
        version: u32,
        _version_message: Option<&str>,
    ) -> Result<(), ConfluenceError> {
        self.fail_if_armed("update_page")?;
        let mut pages = self.pages.write().unwrap();
        let page = pages
            .iter_mut()
            .find(|p| p.id == content_id)
            .ok_or_else(|| Self::not_found("page", content_id))?;
        page.title = title.to_owned();
        page.content = content.to_owned();
        page.version = version;
        if let Some(parent) = parent_id {
            page.parent = Some(parent.to_owned());
        }
        drop(pages);
        self.record(format!("update_page {content_id}"));
        Ok(())
    }

    fn delete_page(&self, content_id: &str) -> Result<(), ConfluenceError> {
        self.fail_if_armed("delete_page")?;
        let mut pages = self.pages.write().unwrap();
        let before = pages.len();
        pages.retain(|p| p.id != content_id);
        if pages.len() == before {
            return Err(Self::not_found("page", content_id));
        }
        drop(pages);
        // Attachments and properties go away with the page
        self.attachments
            .write()
            .unwrap()
            .retain(|a| a.page_id != content_id);
        self.properties
            .write()
            .unwrap()
            .retain(|(id, _), _| id != content_id);
        self.record(format!("delete_page {content_id}"));
        Ok(())
    }

    fn child_pages(&self, content_id: &str) -> Result<Vec<ChildPage>, ConfluenceError> {
        self.fail_if_armed("child_pages")?;
        Ok(self
            .pages
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.parent.as_deref() == Some(content_id))
            .map(|p| ChildPage {
                id: p.id.clone(),
                title: p.title.clone(),
            })
            .collect())
    }

    fn attachments(&self, content_id: &str) -> Result<Vec<RemoteAttachment>, ConfluenceError> {
        self.fail_if_armed("attachments")?;
        Ok(self
            .attachments
            .read()
            .unwrap()
            .iter()
            .filter(|a| a.page_id == content_id)
            .map(|a| RemoteAttachment {
                id: a.id.clone(),
                title: a.title.clone(),
            })
            .collect())
    }

    fn attachment_by_filename(
        &self,
        content_id: &str,
        filename: &str,
    ) -> Result<Option<RemoteAttachment>, ConfluenceError> {
        self.fail_if_armed("attachment_by_filename")?;
        Ok(self
            .attachments
            .read()
            .unwrap()
            .iter()
            .find(|a| a.page_id == content_id && a.title == filename)
            .map(|a| RemoteAttachment {
                id: a.id.clone(),
                title: a.title.clone(),
            }))
    }

    fn add_attachment(
        &self,
        content_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<String, ConfluenceError> {
        self.fail_if_armed("add_attachment")?;
        if !self.pages.read().unwrap().iter().any(|p| p.id == content_id) {
            return Err(Self::not_found("page", content_id));
        }
        let id = self.allocate_id();
        self.attachments.write().unwrap().push(StoredAttachment {
            id: id.clone(),
            page_id: content_id.to_owned(),
            title: filename.to_owned(),
            data: data.to_vec(),
        });
        self.record(format!("add_attachment {filename}"));
        Ok(id)
    }

    fn update_attachment(
        &self,
        content_id: &str,
        attachment_id: &str,
        _filename: &str,
        data: &[u8],
    ) -> Result<(), ConfluenceError> {
        self.fail_if_armed("update_attachment")?;
        let mut attachments = self.attachments.write().unwrap();
        let attachment = attachments
            .iter_mut()
            .find(|a| a.page_id == content_id && a.id == attachment_id)
            .ok_or_else(|| Self::not_found("attachment", attachment_id))?;
        attachment.data = data.to_vec();
        drop(attachments);
        self.record(format!("update_attachment {attachment_id}"));
        Ok(())
    }

    fn delete_attachment(&self, attachment_id: &str) -> Result<(), ConfluenceError> {
        self.fail_if_armed("delete_attachment")?;
        let mut attachments = self.attachments.write().unwrap();
        let before = attachments.len();
        attachments.retain(|a| a.id != attachment_id);
        if attachments.len() == before {
            return Err(Self::not_found("attachment", attachment_id));
        }
        drop(attachments);
        self.record(format!("delete_attachment {attachment_id}"));
        Ok(())
    }

    fn property_by_key(
        &self,
        content_id: &str,
        key: &str,
    ) -> Result<Option<String>, ConfluenceError> {
        self.fail_if_armed("property_by_key")?;
        Ok(self.property(content_id, key))
    }

    fn set_property(
        &self,
        content_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfluenceError> {
        self.fail_if_armed("set_property")?;
        let mut properties = self.properties.write().unwrap();
        let entry = (content_id.to_owned(), key.to_owned());
        // Creating over an existing key is a conflict, as on the server
        if properties.contains_key(&entry) {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!("property {key} already exists on {content_id}"),
            });
        }
        properties.insert(entry, value.to_owned());
        drop(properties);
        self.record(format!("set_property {content_id} {key}"));
        Ok(())
    }

    fn delete_property(&self, content_id: &str, key: &str) -> Result<(), ConfluenceError> {
        self.fail_if_armed("delete_property")?;
        self.properties
            .write()
            .unwrap()
            .remove(&(content_id.to_owned(), key.to_owned()));
        self.record(format!("delete_property {content_id} {key}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mock_is_send_sync() {
        assert_send_sync::<MockConfluence>();
    }

    #[test]
    fn test_new_empty() {
        let remote = MockConfluence::new();

        assert_eq!(remote.page_count(), 0);
        assert!(remote.mutations().is_empty());
    }

    #[test]
    fn test_with_page_lookup() {
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "<p>hi</p>");

        let id = remote.page_id_by_title("DOCS", "Home").unwrap();
        assert_eq!(id.as_deref(), Some("100"));

        let miss = remote.page_id_by_title("DOCS", "Absent").unwrap();
        assert_eq!(miss, None);

        let other_space = remote.page_id_by_title("OTHER", "Home").unwrap();
        assert_eq!(other_space, None);
    }

    #[test]
    fn test_page_by_id_missing() {
        let remote = MockConfluence::new();

        let err = remote.page_by_id("9").unwrap_err();

        assert!(matches!(
            err,
            ConfluenceError::HttpResponse { status: 404, .. }
        ));
    }

    #[test]
    fn test_add_page_assigns_ids_and_links_parent() {
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "");

        let id = remote
            .add_page("DOCS", "100", "Guide", "<p>guide</p>", None)
            .unwrap();

        assert_eq!(remote.child_titles("100"), vec!["Guide"]);
        let page = remote.page_by_id(&id).unwrap();
        assert_eq!(page.title, "Guide");
        assert_eq!(page.version, 1);
        assert_eq!(remote.mutations(), vec!["add_page Guide".to_owned()]);
    }

    #[test]
    fn test_add_page_unknown_ancestor() {
        let remote = MockConfluence::new();

        let result = remote.add_page("DOCS", "404", "Guide", "", None);

        assert!(result.is_err());
    }

    #[test]
    fn test_update_page_writes_version_verbatim() {
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "old");

        remote
            .update_page("100", None, "Home", "new", 2, None)
            .unwrap();

        assert_eq!(remote.page_version("100"), Some(2));
        assert_eq!(remote.page_content("100").as_deref(), Some("new"));
    }

    #[test]
    fn test_update_page_with_parent_moves_page() {
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_page("150", "DOCS", "Archive", "")
            .with_child_page("100", "200", "Guide", "");

        remote
            .update_page("200", Some("150"), "Guide", "", 2, None)
            .unwrap();

        assert!(remote.child_titles("100").is_empty());
        assert_eq!(remote.child_titles("150"), vec!["Guide"]);
    }

    #[test]
    fn test_delete_page_cascades_attachments_and_properties() {
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_attachment("100", "a1", "logo.png", b"png".as_slice())
            .with_property("100", "content-hash", "abc");

        remote.delete_page("100").unwrap();

        assert_eq!(remote.page_count(), 0);
        assert!(remote.attachment_titles("100").is_empty());
        assert_eq!(remote.property("100", "content-hash"), None);
    }

    #[test]
    fn test_attachment_by_filename() {
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_attachment("100", "a1", "logo.png", b"png".as_slice());

        let hit = remote.attachment_by_filename("100", "logo.png").unwrap();
        assert_eq!(hit.map(|a| a.id), Some("a1".to_owned()));

        let miss = remote.attachment_by_filename("100", "other.png").unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_set_property_conflict() {
        let remote = MockConfluence::new().with_property("100", "content-hash", "abc");

        let err = remote.set_property("100", "content-hash", "def").unwrap_err();

        assert!(matches!(
            err,
            ConfluenceError::HttpResponse { status: 409, .. }
        ));
    }

    #[test]
    fn test_delete_property_absent_succeeds() {
        let remote = MockConfluence::new();

        remote.delete_property("100", "content-hash").unwrap();
    }

    #[test]
    fn test_mutation_log_order() {
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "");

        let id = remote.add_page("DOCS", "100", "Guide", "", None).unwrap();
        remote.set_property(&id, "content-hash", "abc").unwrap();
        remote.delete_page(&id).unwrap();

        assert_eq!(
            remote.mutations(),
            vec![
                "add_page Guide".to_owned(),
                format!("set_property {id} content-hash"),
                format!("delete_page {id}"),
            ]
        );
    }

    #[test]
    fn test_clear_mutations() {
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "");
        remote.add_page("DOCS", "100", "Guide", "", None).unwrap();

        remote.clear_mutations();

        assert!(remote.mutations().is_empty());
    }

    #[test]
    fn test_with_failure_on() {
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_failure_on("add_page");

        let result = remote.add_page("DOCS", "100", "Guide", "", None);

        assert!(matches!(
            result,
            Err(ConfluenceError::HttpResponse { status: 500, .. })
        ));
        assert!(remote.mutations().is_empty());
    }
}
