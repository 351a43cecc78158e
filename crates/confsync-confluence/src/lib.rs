//! Confluence integration for Confsync.
//!
//! This crate provides everything needed to publish a rendered page tree
//! into a Confluence space:
//! - [`ConfluenceClient`]: REST API client with basic (API token) authentication
//! - [`ConfluenceApi`]: the capability trait the publisher runs against
//! - [`Publisher`](publisher::Publisher): tree reconciliation workflow that
//!   creates, updates and deletes remote pages and attachments so the space
//!   converges to the local tree
//! - [`MockConfluence`]: in-memory backend for tests
//!
//! # Publishing
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use confsync_confluence::ConfluenceClient;
//! use confsync_confluence::publisher::{Publisher, PublisherMetadata};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     "user@example.com",
//!     "api_token",
//! );
//! let metadata = PublisherMetadata::from_file("site/publish.json".as_ref())?;
//!
//! Publisher::new(&client, metadata)
//!     .with_version_message("automated publish")
//!     .publish()?;
//! # Ok(())
//! # }
//! ```

// Remote capability trait
mod api;
pub use api::ConfluenceApi;

// API client
mod client;
pub use client::ConfluenceClient;

// In-memory backend for tests (behind `mock` feature flag)
#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockConfluence;

// Remote content types
mod types;
pub use types::{ChildPage, RemoteAttachment, RemotePage};

// Publish workflow
pub mod publisher;

// Errors
pub mod error;
pub use error::ConfluenceError;
