//! Manifest describing an exported script tree.
//!
//! Every export writes `export-manifest.json` at the root of the output
//! directory. It records which entity each generated file came from and a
//! SHA-256 checksum of the file content, so a tree can be checked for manual
//! edits before it is replayed with `update-db`.
//!
//! The manifest lives outside the category directories and is never picked
//! up as a script.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use dbmeta_core::ScriptCategory;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// File name of the manifest inside an export root.
pub const MANIFEST_FILE: &str = "export-manifest.json";

/// One generated script file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub category: ScriptCategory,
    /// Entity name as stored in the dictionary.
    pub name: String,
    /// Path relative to the export root, `/`-separated.
    pub file: String,
    /// SHA-256 hex digest of the file content.
    pub checksum: String,
}

/// Top-level export manifest.
///
/// # Examples
///
/// ```
/// use dbmeta_core::ScriptCategory;
/// use dbmeta_scripts::{ExportEntry, ExportManifest};
///
/// let mut manifest = ExportManifest::new("0.1.0");
/// manifest.entries.push(ExportEntry {
///     category: ScriptCategory::Table,
///     name: "T".into(),
///     file: "Tables/T.sql".into(),
///     checksum: ExportManifest::checksum("CREATE TABLE T (\n  ID INTEGER\n);\n"),
/// });
/// assert_eq!(manifest.count(ScriptCategory::Table), 1);
/// assert_eq!(manifest.count(ScriptCategory::Domain), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Version of the tool that produced the export.
    pub tool_version: String,
    /// RFC 3339 timestamp of the export.
    pub generated_at: String,
    /// Generated files in write order.
    pub entries: Vec<ExportEntry>,
}

impl ExportManifest {
    /// Creates an empty manifest stamped with the current time.
    pub fn new(tool_version: impl Into<String>) -> Self {
        Self {
            tool_version: tool_version.into(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            entries: Vec::new(),
        }
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ScriptsError::IoError) if the file cannot
    /// be read, or [`JsonError`](crate::ScriptsError::JsonError) if the
    /// content is not valid manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Computes the SHA-256 hex digest of script text.
    pub fn checksum(text: &str) -> String {
        format!("{:x}", Sha256::digest(text.as_bytes()))
    }

    /// Number of entries in `category`.
    pub fn count(&self, category: ScriptCategory) -> usize {
        self.entries.iter().filter(|e| e.category == category).count()
    }

    /// Returns the entries whose file no longer matches its checksum
    /// (edited or deleted since the export).
    pub fn modified_entries(&self, root: impl AsRef<Path>) -> Vec<&ExportEntry> {
        let root = root.as_ref();
        self.entries
            .iter()
            .filter(|entry| match std::fs::read_to_string(root.join(&entry.file)) {
                Ok(text) => Self::checksum(&text) != entry.checksum,
                Err(_) => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_hex() {
        let a = ExportManifest::checksum("CREATE DOMAIN D AS INTEGER;\n");
        let b = ExportManifest::checksum("CREATE DOMAIN D AS INTEGER;\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, ExportManifest::checksum("CREATE DOMAIN D AS BIGINT;\n"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);

        let mut manifest = ExportManifest::new("1.2.3");
        manifest.entries.push(ExportEntry {
            category: ScriptCategory::Procedure,
            name: "P".into(),
            file: "Procedures/4_P.sql".into(),
            checksum: ExportManifest::checksum("x"),
        });
        manifest.save(&path).unwrap();

        let loaded = ExportManifest::load(&path).unwrap();
        assert_eq!(loaded.tool_version, "1.2.3");
        assert_eq!(loaded.entries, manifest.entries);
    }

    #[test]
    fn test_modified_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Tables")).unwrap();
        std::fs::write(dir.path().join("Tables/A.sql"), "A").unwrap();
        std::fs::write(dir.path().join("Tables/B.sql"), "B").unwrap();

        let mut manifest = ExportManifest::new("0.1.0");
        for (name, text) in [("A", "A"), ("B", "B"), ("C", "C")] {
            manifest.entries.push(ExportEntry {
                category: ScriptCategory::Table,
                name: name.into(),
                file: format!("Tables/{name}.sql"),
                checksum: ExportManifest::checksum(text),
            });
        }
        std::fs::write(dir.path().join("Tables/B.sql"), "B edited").unwrap();

        let modified: Vec<_> = manifest
            .modified_entries(dir.path())
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(modified, vec!["B", "C"]);
    }
}
