//! CLI error types.

use confsync_config::ConfigError;
use confsync_confluence::publisher::{MetadataError, PublishError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Metadata(#[from] MetadataError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Validation(String),
}
