//! Writing of exported script trees.
//!
//! [`ExportWriter`] lays out the same tree [`ScriptSet`](crate::ScriptSet)
//! reads: one sub-directory per category, one file per entity, plus the
//! [`ExportManifest`] at the root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dbmeta_core::ScriptCategory;

use crate::config::ToolConfig;
use crate::error::{Result, ScriptsError};
use crate::manifest::{ExportEntry, ExportManifest, MANIFEST_FILE};

/// Writes generated scripts into an output directory.
///
/// # Examples
///
/// ```no_run
/// use dbmeta_core::ScriptCategory;
/// use dbmeta_scripts::{ExportWriter, ToolConfig};
///
/// let mut writer = ExportWriter::create("out/", &ToolConfig::default(), "0.1.0").unwrap();
/// writer
///     .write(ScriptCategory::Domain, "D_ID", "D_ID", "CREATE DOMAIN D_ID AS INTEGER;")
///     .unwrap();
/// let manifest = writer.finish().unwrap();
/// assert_eq!(manifest.count(ScriptCategory::Domain), 1);
/// ```
#[derive(Debug)]
pub struct ExportWriter {
    root: PathBuf,
    extension: String,
    manifest: ExportManifest,
    /// Lower-cased file names already written, per category.
    taken: HashSet<(ScriptCategory, String)>,
}

impl ExportWriter {
    /// Creates the output root and all category directories if absent.
    pub fn create(
        root: impl AsRef<Path>,
        config: &ToolConfig,
        tool_version: impl Into<String>,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for category in ScriptCategory::ALL {
            let dir = root.join(category.dir_name());
            std::fs::create_dir_all(&dir).map_err(|e| ScriptsError::at(&dir, e))?;
        }
        Ok(Self {
            root,
            extension: config.script_extension.clone(),
            manifest: ExportManifest::new(tool_version),
            taken: HashSet::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `<category dir>/<stem>.<ext>` with a trailing newline and
    /// records it in the manifest. Files left over from earlier exports are
    /// overwritten.
    ///
    /// Distinct entities can share a stem once their names are sanitized
    /// (`D:X` and `D_X`), and names differing only in case share a file on
    /// case-insensitive filesystems. A stem already written in this export
    /// gets the first free `_2`, `_3`, ... suffix instead.
    pub fn write(
        &mut self,
        category: ScriptCategory,
        name: &str,
        stem: &str,
        text: &str,
    ) -> Result<PathBuf> {
        let mut file_name = format!("{stem}.{}", self.extension);
        let mut n = 1;
        while !self.taken.insert((category, file_name.to_lowercase())) {
            n += 1;
            file_name = format!("{stem}_{n}.{}", self.extension);
        }
        if n > 1 {
            tracing::warn!(
                category = %category,
                entity = name,
                file = %file_name,
                "file name already taken in this export"
            );
        }
        let path = self.root.join(category.dir_name()).join(&file_name);

        let mut content = text.trim_end().to_string();
        content.push('\n');
        std::fs::write(&path, &content).map_err(|e| ScriptsError::at(&path, e))?;
        tracing::info!(category = %category, file = %file_name, "exported script");

        self.manifest.entries.push(ExportEntry {
            category,
            name: name.to_string(),
            file: format!("{}/{file_name}", category.dir_name()),
            checksum: ExportManifest::checksum(&content),
        });
        Ok(path)
    }

    /// Saves the manifest and returns it.
    pub fn finish(self) -> Result<ExportManifest> {
        let path = self.root.join(MANIFEST_FILE);
        self.manifest.save(&path)?;
        Ok(self.manifest)
    }
}
