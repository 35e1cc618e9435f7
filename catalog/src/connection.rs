//! Connection string parsing.
//!
//! Two forms are accepted:
//!
//! - a bare path: `/var/db/app.fdb`
//! - a `key=value;...` list as used by database client libraries:
//!   `DataSource=localhost;Database=/var/db/app.fdb;User=SYSDBA;Password=masterkey`
//!
//! Keys are case-insensitive. `Database`, `Initial Catalog` and
//! `Data Source`/`DataSource` (when no `Database` is given) name the catalog
//! file. Other keys are kept in [`ConnectionString::options`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};

const DATABASE_KEYS: [&str; 2] = ["database", "initial catalog"];
const DATA_SOURCE_KEYS: [&str; 2] = ["data source", "datasource"];

/// A parsed connection string.
///
/// # Examples
///
/// ```
/// use dbmeta_catalog::ConnectionString;
///
/// let conn = ConnectionString::parse("DataSource=localhost;Database=/tmp/app.fdb;User=SYSDBA").unwrap();
/// assert_eq!(conn.database(), std::path::Path::new("/tmp/app.fdb"));
/// assert_eq!(conn.option("user"), Some("SYSDBA"));
///
/// let conn = ConnectionString::parse("/tmp/app.fdb").unwrap();
/// assert_eq!(conn.database(), std::path::Path::new("/tmp/app.fdb"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    database: PathBuf,
    options: BTreeMap<String, String>,
}

impl ConnectionString {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidConnectionString`] if the string is
    /// empty or names no database.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CatalogError::InvalidConnectionString(
                "connection string is empty".to_string(),
            ));
        }
        if !raw.contains('=') {
            return Ok(Self::for_path(raw));
        }

        let mut options = BTreeMap::new();
        for pair in raw.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CatalogError::InvalidConnectionString(format!("expected key=value, got '{pair}'"))
            })?;
            options.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        let database = DATABASE_KEYS
            .iter()
            .chain(DATA_SOURCE_KEYS.iter())
            .find_map(|key| options.remove(*key).filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                CatalogError::InvalidConnectionString(format!("no database in '{raw}'"))
            })?;

        Ok(Self {
            database: PathBuf::from(database),
            options,
        })
    }

    /// Builds a connection string for a catalog file.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            database: path.into(),
            options: BTreeMap::new(),
        }
    }

    /// Path of the catalog file.
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Looks up a non-database option (key is case-insensitive).
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Server named by `Data Source`/`DataSource`, when it was not used as
    /// the database path.
    pub fn data_source(&self) -> Option<&str> {
        DATA_SOURCE_KEYS.iter().find_map(|key| self.option(key))
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }
}

impl fmt::Display for ConnectionString {
    // Options are left out so credentials never reach logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.database.display())
    }
}
