//! Tool configuration.
//!
//! Defines the YAML-serializable settings that control where catalogs are
//! created and which script files are picked up. Every field has a default,
//! so a configuration file only needs the values it overrides.
//!
//! # Example YAML
//!
//! ```yaml
//! backend: firebird
//! database_file: fb_database.fdb
//! page_size: 8192
//! script_extension: sql
//! system_prefix: RDB$
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable naming an optional configuration file.
pub const CONFIG_ENV_VAR: &str = "DBMETA_CONFIG";

/// Catalog transport the command-line tool connects with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// A Firebird server, reached over its wire protocol.
    #[default]
    Firebird,
    /// A local SQLite file.
    Sqlite,
}

/// Settings shared by the build, export and update workflows.
///
/// # Examples
///
/// ```
/// use dbmeta_scripts::ToolConfig;
///
/// let config: ToolConfig = serde_yaml::from_str("page_size: 4096").unwrap();
/// assert_eq!(config.page_size, 4096);
/// assert_eq!(config.database_file, "fb_database.fdb");
/// assert!(config.matches_extension("CUSTOMERS.SQL".as_ref()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Transport `dbmeta` uses to reach the catalog.
    pub backend: Backend,
    /// File name of the catalog created by `build-db` inside `--db-dir`.
    pub database_file: String,
    /// Page size used when creating a new catalog.
    pub page_size: u32,
    /// Extension (without dot) of executable script files.
    pub script_extension: String,
    /// Name prefix reserved for engine-owned dictionary objects.
    pub system_prefix: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Firebird,
            database_file: "fb_database.fdb".to_string(),
            page_size: 8192,
            script_extension: "sql".to_string(),
            system_prefix: "RDB$".to_string(),
        }
    }
}

impl ToolConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ScriptsError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::ScriptsError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or returns the defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                tracing::debug!(path = ?path, "loading configuration");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Returns `true` if `path` carries the script extension (ASCII
    /// case-insensitive).
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.script_extension))
    }
}
