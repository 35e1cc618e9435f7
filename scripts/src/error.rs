//! Error types for script tree operations.
//!
//! Covers the filesystem side of the tool: reading script trees, writing
//! exported scripts, and loading configuration and manifests.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing script trees.
#[derive(Debug, Error)]
pub enum ScriptsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// I/O failure tied to a specific path.
    #[error("failed to access '{}': {source}", .path.display())]
    PathError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scripts root directory does not exist.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A script file is not valid UTF-8 text.
    #[error("script '{}' is not valid UTF-8", .0.display())]
    InvalidUtf8(PathBuf),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl ScriptsError {
    pub(crate) fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScriptsError::PathError {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`ScriptsError`].
pub type Result<T> = std::result::Result<T, ScriptsError>;
