//! Remote content types.

/// A remote page with its storage body and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Content ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Page body in storage representation.
    pub content: String,
    /// Current version number (starts at 1).
    pub version: u32,
}

/// A direct child page as returned by child listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPage {
    /// Content ID.
    pub id: String,
    /// Page title.
    pub title: String,
}

/// A remote attachment. The title is the filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAttachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
}
