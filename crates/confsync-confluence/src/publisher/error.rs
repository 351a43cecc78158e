//! Publish workflow errors.

use std::path::PathBuf;

use crate::error::ConfluenceError;

/// Error during a publish run.
///
/// There is no rollback: when a publish aborts, changes already applied
/// remain on the remote side.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Pre-flight validation failed. Nothing was mutated.
    #[error("Publish error: {0}")]
    Validation(String),

    /// A remote API call failed.
    #[error("Confluence API error: {0}")]
    Api(#[from] ConfluenceError),

    /// A local content or attachment file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_keeps_http_detail() {
        let err = PublishError::from(ConfluenceError::HttpResponse {
            status: 404,
            body: "no such page".to_owned(),
        });

        let message = err.to_string();
        assert!(message.contains("404"), "{message}");
        assert!(message.contains("no such page"), "{message}");
    }

    #[test]
    fn test_io_error_display_names_path_and_reason() {
        let err = PublishError::Io {
            path: PathBuf::from("pages/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file vanished"),
        };

        let message = err.to_string();
        assert!(message.contains("pages/index.html"), "{message}");
        assert!(message.contains("file vanished"), "{message}");
    }
}
