//! Publish workflow for Confluence.
//!
//! This module provides the [`Publisher`] struct that reconciles a local
//! page tree against the state of a remote space:
//!
//! 1. Validate the publish request
//! 2. Walk the tree per the configured [`PublishStrategy`]
//! 3. For each page: look it up by title, create it or update it in place
//! 4. Reconcile the page's attachments
//! 5. Recurse into child pages, deleting orphaned remote subtrees
//!
//! Change detection is hash based. Every published body and attachment
//! stores its SHA-256 digest in a content property on the remote side;
//! an unchanged digest skips the write entirely, so publishing the same
//! tree twice performs zero mutating calls on the second run.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use confsync_confluence::ConfluenceClient;
//! use confsync_confluence::publisher::{PublishStrategy, Publisher, PublisherMetadata};
//!
//! let client = ConfluenceClient::new("https://confluence.example.com", "user", "token");
//! let metadata = PublisherMetadata::from_file(Path::new("site/publish.json"))?;
//!
//! Publisher::new(&client, metadata)
//!     .with_strategy(PublishStrategy::AppendDeleteOrphans)
//!     .with_version_message("nightly docs publish")
//!     .publish()?;
//! # Ok(())
//! # }
//! ```

mod attachments;
mod error;
mod hash;
mod listener;
mod metadata;
mod page;
mod tree;

pub use error::PublishError;
pub use hash::{CONTENT_HASH_KEY, content_hash, hash_changed};
pub use listener::{NoopListener, PublishListener};
pub use metadata::{MetadataError, PageNode, PublisherMetadata};

use std::fmt;
use std::str::FromStr;

use crate::api::ConfluenceApi;

/// How the published tree attaches to the remote ancestor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishStrategy {
    /// Root pages become children of the ancestor. Remote children of
    /// any reconciled page that match no local page are deleted.
    #[default]
    AppendDeleteOrphans,
    /// Root pages become children of the ancestor. Orphaned remote
    /// pages are left untouched at every level.
    AppendKeepChildren,
    /// The single root page is published onto the ancestor page itself;
    /// its children attach below, with orphan deletion.
    ReplaceAncestor,
}

impl PublishStrategy {
    fn delete_orphans(self) -> bool {
        !matches!(self, PublishStrategy::AppendKeepChildren)
    }
}

impl fmt::Display for PublishStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStrategy::AppendDeleteOrphans => "append-delete-orphans",
            PublishStrategy::AppendKeepChildren => "append-keep-children",
            PublishStrategy::ReplaceAncestor => "replace-ancestor",
        };
        f.write_str(name)
    }
}

impl FromStr for PublishStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append-delete-orphans" => Ok(PublishStrategy::AppendDeleteOrphans),
            "append-keep-children" => Ok(PublishStrategy::AppendKeepChildren),
            "replace-ancestor" => Ok(PublishStrategy::ReplaceAncestor),
            _ => Err(format!(
                "unknown publish strategy '{s}' (expected append-delete-orphans, \
                 append-keep-children or replace-ancestor)"
            )),
        }
    }
}

/// Shared state for one publish run.
struct Reconciler<'a> {
    api: &'a dyn ConfluenceApi,
    space_key: &'a str,
    version_message: Option<&'a str>,
    listener: &'a dyn PublishListener,
    delete_orphans: bool,
}

/// Publishes a page tree into a Confluence space.
///
/// Runs against any [`ConfluenceApi`] backend and performs the minimal
/// set of remote calls to make the space match the tree. There is no
/// rollback: an aborted run leaves the changes applied so far.
pub struct Publisher<'a> {
    api: &'a dyn ConfluenceApi,
    metadata: PublisherMetadata,
    strategy: PublishStrategy,
    version_message: Option<String>,
    listener: &'a dyn PublishListener,
}

impl<'a> Publisher<'a> {
    /// Create a publisher with the default strategy and no listener.
    #[must_use]
    pub fn new(api: &'a dyn ConfluenceApi, metadata: PublisherMetadata) -> Self {
        Self {
            api,
            metadata,
            strategy: PublishStrategy::default(),
            version_message: None,
            listener: &NoopListener,
        }
    }

    /// Set the publishing strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: PublishStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the version message recorded on created and updated pages.
    #[must_use]
    pub fn with_version_message(mut self, message: impl Into<String>) -> Self {
        self.version_message = Some(message.into());
        self
    }

    /// Set the listener notified of every applied change.
    #[must_use]
    pub fn with_listener(mut self, listener: &'a dyn PublishListener) -> Self {
        self.listener = listener;
        self
    }

    /// Run the publish.
    ///
    /// On success every change notification has fired and
    /// `publish_completed` is emitted exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Validation`] before any remote call when
    /// the request is malformed, [`PublishError::Io`] when local content
    /// cannot be read, and [`PublishError::Api`] when a remote call
    /// fails. Partial changes are not rolled back.
    pub fn publish(&self) -> Result<(), PublishError> {
        self.validate()?;

        let reconciler = Reconciler {
            api: self.api,
            space_key: &self.metadata.space_key,
            version_message: self.version_message.as_deref(),
            listener: self.listener,
            delete_orphans: self.strategy.delete_orphans(),
        };

        match self.strategy {
            PublishStrategy::AppendDeleteOrphans | PublishStrategy::AppendKeepChildren => {
                reconciler.publish_under(&self.metadata.ancestor_id, &self.metadata.root_pages)?;
            }
            PublishStrategy::ReplaceAncestor => {
                if let Some(root) = self.single_root_page()? {
                    reconciler.publish_replacing(&self.metadata.ancestor_id, root)?;
                }
            }
        }

        self.listener.publish_completed();
        Ok(())
    }

    fn validate(&self) -> Result<(), PublishError> {
        if self.metadata.space_key.trim().is_empty() {
            return Err(PublishError::Validation(
                "space key cannot be blank".to_owned(),
            ));
        }
        if self.metadata.ancestor_id.trim().is_empty() {
            return Err(PublishError::Validation(
                "ancestor id cannot be blank".to_owned(),
            ));
        }
        Ok(())
    }

    /// The lone root page under the replace strategy, if any.
    fn single_root_page(&self) -> Result<Option<&PageNode>, PublishError> {
        match self.metadata.root_pages.as_slice() {
            [] => Ok(None),
            [root] => Ok(Some(root)),
            many => {
                let titles: Vec<&str> = many.iter().map(|p| p.title.as_str()).collect();
                Err(PublishError::Validation(format!(
                    "replace-ancestor requires at most one root page, found {}: {}",
                    many.len(),
                    titles.join(", ")
                )))
            }
        }
    }
}
