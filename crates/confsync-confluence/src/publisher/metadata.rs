//! Desired-state page tree handed over by the renderer.
//!
//! The renderer writes a JSON document describing the pages to publish;
//! [`PublisherMetadata::from_file`] loads it and resolves the content and
//! attachment paths relative to the file's directory. The tree is
//! read-only for the duration of a publish.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error loading publisher metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// File not found.
    #[error("Metadata file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation error.
    #[error("Metadata error: {0}")]
    Validation(String),
}

/// One page to publish: a title, rendered content on disk, attachments
/// and an ordered list of child pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNode {
    /// Page title. Non-blank; unique within the space by convention.
    pub title: String,
    /// Path to the rendered storage-format body.
    pub content_path: PathBuf,
    /// Attachments by filename. Deterministic iteration order.
    #[serde(default)]
    pub attachments: BTreeMap<String, PathBuf>,
    /// Child pages, in publish order.
    #[serde(default)]
    pub children: Vec<PageNode>,
    /// Labels carried through for downstream tooling. Never reconciled
    /// and never triggers a remote update on its own.
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl PageNode {
    /// Create a leaf page node.
    #[must_use]
    pub fn new(title: impl Into<String>, content_path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            content_path: content_path.into(),
            attachments: BTreeMap::new(),
            children: Vec::new(),
            labels: BTreeSet::new(),
        }
    }

    /// Add an attachment by filename.
    #[must_use]
    pub fn with_attachment(
        mut self,
        filename: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.attachments.insert(filename.into(), path.into());
        self
    }

    /// Add a child page.
    #[must_use]
    pub fn with_child(mut self, child: PageNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.content_path.is_relative() {
            self.content_path = base.join(&self.content_path);
        }
        for path in self.attachments.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        for child in &mut self.children {
            child.resolve_paths(base);
        }
    }

    fn validate(&self) -> Result<(), MetadataError> {
        if self.title.trim().is_empty() {
            return Err(MetadataError::Validation(
                "page title cannot be blank".to_owned(),
            ));
        }
        for filename in self.attachments.keys() {
            if filename.trim().is_empty() {
                return Err(MetadataError::Validation(format!(
                    "attachment filename cannot be blank (page '{}')",
                    self.title
                )));
            }
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}

/// The full publish request: target space, anchor page and page tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherMetadata {
    /// Key of the space to publish into. A hand-off may leave this
    /// empty for the caller to fill in.
    #[serde(default)]
    pub space_key: String,
    /// ID of the remote page the tree attaches to. Like `space_key`,
    /// optional in the file.
    #[serde(default)]
    pub ancestor_id: String,
    /// Root pages of the tree, in publish order.
    #[serde(default)]
    pub root_pages: Vec<PageNode>,
}

impl PublisherMetadata {
    /// Create a publish request.
    #[must_use]
    pub fn new(space_key: impl Into<String>, ancestor_id: impl Into<String>) -> Self {
        Self {
            space_key: space_key.into(),
            ancestor_id: ancestor_id.into(),
            root_pages: Vec::new(),
        }
    }

    /// Add a root page.
    #[must_use]
    pub fn with_root_page(mut self, page: PageNode) -> Self {
        self.root_pages.push(page);
        self
    }

    /// Load a publish request from a JSON file.
    ///
    /// Relative content and attachment paths are resolved against the
    /// file's parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid
    /// JSON, or contains blank page titles or attachment filenames.
    pub fn from_file(path: &Path) -> Result<Self, MetadataError> {
        if !path.exists() {
            return Err(MetadataError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut metadata: Self = serde_json::from_str(&content)?;

        let base = path.parent().unwrap_or(Path::new("."));
        for node in &mut metadata.root_pages {
            node.resolve_paths(base);
        }

        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<(), MetadataError> {
        for node in &self.root_pages {
            node.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_metadata(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("publish.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_metadata(
            dir.path(),
            r#"{
                "space_key": "DOCS",
                "ancestor_id": "100",
                "root_pages": [{
                    "title": "Guide",
                    "content_path": "pages/guide.html",
                    "attachments": {"logo.png": "assets/logo.png"},
                    "children": [{
                        "title": "Install",
                        "content_path": "pages/install.html"
                    }]
                }]
            }"#,
        );

        let metadata = PublisherMetadata::from_file(&path).unwrap();

        assert_eq!(metadata.space_key, "DOCS");
        assert_eq!(metadata.ancestor_id, "100");
        assert_eq!(metadata.root_pages.len(), 1);

        let root = &metadata.root_pages[0];
        assert_eq!(root.content_path, dir.path().join("pages/guide.html"));
        assert_eq!(
            root.attachments["logo.png"],
            dir.path().join("assets/logo.png")
        );
        assert_eq!(
            root.children[0].content_path,
            dir.path().join("pages/install.html")
        );
    }

    #[test]
    fn test_from_file_keeps_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_metadata(
            dir.path(),
            r#"{
                "space_key": "DOCS",
                "ancestor_id": "100",
                "root_pages": [{
                    "title": "Guide",
                    "content_path": "/rendered/guide.html"
                }]
            }"#,
        );

        let metadata = PublisherMetadata::from_file(&path).unwrap();

        assert_eq!(
            metadata.root_pages[0].content_path,
            PathBuf::from("/rendered/guide.html")
        );
    }

    #[test]
    fn test_from_file_without_target_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_metadata(dir.path(), r#"{"root_pages": []}"#);

        let metadata = PublisherMetadata::from_file(&path).unwrap();

        assert_eq!(metadata.space_key, "");
        assert_eq!(metadata.ancestor_id, "");
        assert!(metadata.root_pages.is_empty());
    }

    #[test]
    fn test_from_file_missing() {
        let result = PublisherMetadata::from_file(Path::new("/nonexistent/publish.json"));

        assert!(matches!(result, Err(MetadataError::NotFound(_))));
    }

    #[test]
    fn test_from_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_metadata(dir.path(), "not json");

        let result = PublisherMetadata::from_file(&path);

        assert!(matches!(result, Err(MetadataError::Parse(_))));
    }

    #[test]
    fn test_from_file_blank_title_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_metadata(
            dir.path(),
            r#"{
                "space_key": "DOCS",
                "ancestor_id": "100",
                "root_pages": [{
                    "title": "Guide",
                    "content_path": "guide.html",
                    "children": [{"title": "   ", "content_path": "child.html"}]
                }]
            }"#,
        );

        let result = PublisherMetadata::from_file(&path);

        assert!(matches!(result, Err(MetadataError::Validation(_))));
    }

    #[test]
    fn test_builders() {
        let metadata = PublisherMetadata::new("DOCS", "100").with_root_page(
            PageNode::new("Guide", "guide.html")
                .with_attachment("logo.png", "logo.png")
                .with_label("generated")
                .with_child(PageNode::new("Install", "install.html")),
        );

        assert_eq!(metadata.root_pages[0].title, "Guide");
        assert_eq!(metadata.root_pages[0].children[0].title, "Install");
        assert!(metadata.root_pages[0].labels.contains("generated"));
    }
}
