//! Attachment reconciliation: upload new data, delete stale files.

use std::path::Path;

use tracing::debug;

use super::Reconciler;
use super::error::PublishError;
use super::hash::{content_hash, hash_changed};
use super::metadata::PageNode;

impl Reconciler<'_> {
    /// Bring a page's remote attachments in line with the node's set.
    ///
    /// An attachment's hash property is keyed by the attachment's own ID
    /// and stored on the owning page, so a renamed local file reconciles
    /// as delete plus re-upload.
    pub(super) fn reconcile_attachments(
        &self,
        content_id: &str,
        node: &PageNode,
    ) -> Result<(), PublishError> {
        self.delete_stale_attachments(content_id, node)?;

        for (filename, path) in &node.attachments {
            self.add_or_update_attachment(content_id, filename, path)?;
        }

        Ok(())
    }

    /// Delete remote attachments that have no local counterpart.
    fn delete_stale_attachments(
        &self,
        content_id: &str,
        node: &PageNode,
    ) -> Result<(), PublishError> {
        for attachment in self.api.attachments(content_id)? {
            if node.attachments.contains_key(&attachment.title) {
                continue;
            }
            // Hash property first, then the binary
            self.api.delete_property(content_id, &attachment.id)?;
            self.api.delete_attachment(&attachment.id)?;
            self.listener
                .attachment_deleted(&attachment.title, content_id);
        }
        Ok(())
    }

    fn add_or_update_attachment(
        &self,
        content_id: &str,
        filename: &str,
        path: &Path,
    ) -> Result<(), PublishError> {
        let data = std::fs::read(path).map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let hash = content_hash(&data);

        match self.api.attachment_by_filename(content_id, filename)? {
            None => {
                let attachment_id = self.api.add_attachment(content_id, filename, &data)?;
                self.api.set_property(content_id, &attachment_id, &hash)?;
                self.listener.attachment_added(filename, content_id);
            }
            Some(existing) => {
                let stored = self.api.property_by_key(content_id, &existing.id)?;
                if !hash_changed(stored.as_deref(), &hash) {
                    debug!("Attachment '{}' unchanged, skipping", filename);
                    return Ok(());
                }
                self.api.delete_property(content_id, &existing.id)?;
                self.api
                    .update_attachment(content_id, &existing.id, filename, &data)?;
                self.api.set_property(content_id, &existing.id, &hash)?;
                self.listener.attachment_updated(filename, content_id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConfluenceApi;
    use crate::mock::MockConfluence;
    use crate::publisher::listener::NoopListener;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    fn reconciler<'a>(remote: &'a MockConfluence) -> Reconciler<'a> {
        Reconciler {
            api: remote,
            space_key: "DOCS",
            version_message: None,
            listener: &NoopListener,
            delete_orphans: true,
        }
    }

    #[test]
    fn test_adds_new_attachment_with_hash_property() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_file(dir.path(), "logo.png", b"png bytes");
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "");
        let node = PageNode::new("Home", "unused.html").with_attachment("logo.png", logo);

        reconciler(&remote)
            .reconcile_attachments("100", &node)
            .unwrap();

        assert_eq!(remote.attachment_titles("100"), vec!["logo.png"]);
        let attachment_id = remote
            .attachment_by_filename("100", "logo.png")
            .unwrap()
            .unwrap()
            .id;
        assert_eq!(
            remote.property("100", &attachment_id),
            Some(content_hash(b"png bytes"))
        );
    }

    #[test]
    fn test_updates_changed_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_file(dir.path(), "logo.png", b"new bytes");
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_attachment("100", "a1", "logo.png", b"old bytes".as_slice())
            .with_property("100", "a1", &content_hash(b"old bytes"));
        let node = PageNode::new("Home", "unused.html").with_attachment("logo.png", logo);

        reconciler(&remote)
            .reconcile_attachments("100", &node)
            .unwrap();

        assert_eq!(remote.attachment_data("a1"), Some(b"new bytes".to_vec()));
        assert_eq!(
            remote.property("100", "a1"),
            Some(content_hash(b"new bytes"))
        );
    }

    #[test]
    fn test_skips_unchanged_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_file(dir.path(), "logo.png", b"same bytes");
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_attachment("100", "a1", "logo.png", b"same bytes".as_slice())
            .with_property("100", "a1", &content_hash(b"same bytes"));
        let node = PageNode::new("Home", "unused.html").with_attachment("logo.png", logo);

        reconciler(&remote)
            .reconcile_attachments("100", &node)
            .unwrap();

        assert!(remote.mutations().is_empty());
    }

    #[test]
    fn test_deletes_stale_attachment_property_first() {
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_attachment("100", "a1", "old.png", b"bytes".as_slice())
            .with_property("100", "a1", &content_hash(b"bytes"));
        let node = PageNode::new("Home", "unused.html");

        reconciler(&remote)
            .reconcile_attachments("100", &node)
            .unwrap();

        assert!(remote.attachment_titles("100").is_empty());
        assert_eq!(remote.property("100", "a1"), None);
        assert_eq!(
            remote.mutations(),
            vec![
                "delete_property 100 a1".to_owned(),
                "delete_attachment a1".to_owned(),
            ]
        );
    }

    #[test]
    fn test_rename_is_delete_plus_add() {
        let dir = tempfile::tempdir().unwrap();
        let renamed = write_file(dir.path(), "new.png", b"bytes");
        let remote = MockConfluence::new()
            .with_page("100", "DOCS", "Home", "")
            .with_attachment("100", "a1", "old.png", b"bytes".as_slice())
            .with_property("100", "a1", &content_hash(b"bytes"));
        let node = PageNode::new("Home", "unused.html").with_attachment("new.png", renamed);

        reconciler(&remote)
            .reconcile_attachments("100", &node)
            .unwrap();

        assert_eq!(remote.attachment_titles("100"), vec!["new.png"]);
        assert_eq!(remote.attachment_data("a1"), None);
    }

    #[test]
    fn test_unreadable_attachment_is_io_error() {
        let remote = MockConfluence::new().with_page("100", "DOCS", "Home", "");
        let node =
            PageNode::new("Home", "unused.html").with_attachment("logo.png", "/nonexistent.png");

        let err = reconciler(&remote)
            .reconcile_attachments("100", &node)
            .unwrap_err();

        assert!(matches!(err, PublishError::Io { .. }));
    }
}
