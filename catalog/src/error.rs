//! Error types for catalog operations.
//!
//! Provides a unified error type covering catalog access, script execution
//! and the filesystem failures that abort a workflow.

use std::path::PathBuf;

use dbmeta_core::ScriptCategory;
use thiserror::Error;

/// Errors that can occur while talking to a catalog or running a workflow.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Firebird server or wire protocol failure.
    #[error("database error: {0}")]
    Firebird(#[from] rsfbclient::FbError),

    /// A catalog query failed in a transport that does not use rusqlite.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A result row did not have the shape the query expects.
    #[error("unexpected row shape: {0}")]
    RowShape(String),

    /// The connection string does not name a database.
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// The catalog file to open does not exist.
    #[error("catalog not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    /// A statement failed; the file's transaction was rolled back.
    #[error("script {category}/{file} failed at statement {statement}: {source}")]
    ScriptExecution {
        category: ScriptCategory,
        file: String,
        /// 1-based index of the failing statement within the file.
        statement: usize,
        #[source]
        source: Box<CatalogError>,
    },

    /// Script tree loading or writing failure.
    #[error(transparent)]
    Scripts(#[from] dbmeta_scripts::ScriptsError),

    /// File I/O failure outside the script tree.
    #[error("I/O error on '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::IoError {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for failures of the catalog transport itself
    /// (connection, creation, query).
    pub fn is_catalog_access(&self) -> bool {
        matches!(
            self,
            CatalogError::DatabaseError(_)
                | CatalogError::Firebird(_)
                | CatalogError::QueryFailed(_)
                | CatalogError::RowShape(_)
                | CatalogError::InvalidConnectionString(_)
                | CatalogError::CatalogNotFound(_)
        )
    }
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
