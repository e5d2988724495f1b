//! Error types for the cc-obs library.
//!
//! The hook engine itself is infallible; every error here comes from reading,
//! parsing or writing one of the two containers (settings JSON, agent-file
//! header) or the event log.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by cc-obs library operations.
#[derive(Debug, Error)]
pub enum ObsError {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings document or event line is not valid JSON.
    #[error("Failed to parse JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be rendered back to JSON.
    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An agent-file header is not valid YAML.
    #[error("Failed to parse YAML header: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Parsed fine, but not in the shape the hook engine understands.
    #[error("Invalid hook document: {0}")]
    InvalidDocument(String),

    /// A header was opened with `---` but never closed.
    #[error("Header starting with '---' is missing its closing delimiter")]
    UnterminatedHeader,
}

impl ObsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for cc-obs library operations.
pub type Result<T> = std::result::Result<T, ObsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = ObsError::io(
            "/tmp/settings.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/settings.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_invalid_document_display() {
        let err = ObsError::InvalidDocument("hooks is not an object".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid hook document: hooks is not an object"
        );
    }
}
