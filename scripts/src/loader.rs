//! Loading of script trees from disk.
//!
//! A script tree is a root directory with one sub-directory per
//! [`ScriptCategory`] (`Domains`, `Tables`, `Procedures`). [`ScriptSet`]
//! reads the whole tree up front, so filesystem problems surface before any
//! catalog is touched.
//!
//! Ordering is explicit and total: categories follow
//! [`ScriptCategory::ALL`], files within a category are sorted by file
//! name with a plain lexicographic comparison, independent of the order the
//! filesystem lists them in.
//!
//! ```no_run
//! use dbmeta_scripts::{ScriptSet, ToolConfig};
//!
//! let set = ScriptSet::from_dir("schema/", &ToolConfig::default()).unwrap();
//! for script in set.scripts() {
//!     println!("{} / {}", script.category, script.file_name);
//! }
//! ```

use std::path::{Path, PathBuf};

use dbmeta_core::{ScriptCategory, StatementBatch, split_script};

use crate::config::ToolConfig;
use crate::error::{Result, ScriptsError};

/// One script file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScript {
    pub category: ScriptCategory,
    pub file_name: String,
    pub path: PathBuf,
    pub text: String,
}

impl RawScript {
    /// Splits the script text into its statements.
    pub fn statements(&self) -> StatementBatch {
        split_script(&self.text)
    }
}

/// All scripts of a tree, in execution order.
#[derive(Debug, Clone)]
pub struct ScriptSet {
    root: PathBuf,
    scripts: Vec<RawScript>,
}

impl ScriptSet {
    /// Reads every script under `root`.
    ///
    /// A missing category directory counts as empty and is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptsError::DirectoryNotFound`] if `root` is not a
    /// directory, [`ScriptsError::InvalidUtf8`] for a script that is not
    /// UTF-8 text, or [`ScriptsError::PathError`] when a directory or file
    /// cannot be read.
    pub fn from_dir(root: impl AsRef<Path>, config: &ToolConfig) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ScriptsError::DirectoryNotFound(root.to_path_buf()));
        }

        let mut scripts = Vec::new();
        for category in ScriptCategory::ALL {
            let dir = root.join(category.dir_name());
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "category directory missing, skipping");
                continue;
            }
            for path in list_scripts(&dir, config)? {
                scripts.push(read_script(category, path)?);
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            scripts,
        })
    }

    /// Root directory the set was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All scripts in execution order.
    pub fn scripts(&self) -> &[RawScript] {
        &self.scripts
    }

    /// Scripts of one category, sorted by file name.
    pub fn category(&self, category: ScriptCategory) -> impl Iterator<Item = &RawScript> {
        self.scripts.iter().filter(move |s| s.category == category)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Lists script files in `dir`, sorted by file name.
pub fn list_scripts(dir: &Path, config: &ToolConfig) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ScriptsError::at(dir, e))?;
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ScriptsError::at(dir, e))?;
        let path = entry.path();
        if !path.is_file() || !config.matches_extension(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

fn read_script(category: ScriptCategory, path: PathBuf) -> Result<RawScript> {
    let bytes = std::fs::read(&path).map_err(|e| ScriptsError::at(&path, e))?;
    let text = String::from_utf8(bytes).map_err(|_| ScriptsError::InvalidUtf8(path.clone()))?;
    // A leading byte-order mark is not part of the first statement.
    let text = match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(RawScript {
        category,
        file_name,
        path,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_missing_root_is_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = ScriptSet::from_dir(&missing, &ToolConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptsError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn test_categories_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("Procedures"), "1_P.sql", "P");
        write(&dir.path().join("Tables"), "T.sql", "T");
        write(&dir.path().join("Domains"), "D.sql", "D");

        let set = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap();
        assert_eq!(set.root(), dir.path());
        let order: Vec<_> = set.scripts().iter().map(|s| s.category).collect();
        assert_eq!(order, ScriptCategory::ALL.to_vec());
    }

    #[test]
    fn test_files_sorted_by_name_and_filtered_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let tables = dir.path().join("Tables");
        write(&tables, "02_y.sql", "Y");
        write(&tables, "10_z.SQL", "Z");
        write(&tables, "01_x.sql", "X");
        write(&tables, "readme.txt", "ignored");

        let set = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap();
        let names: Vec<_> = set
            .category(ScriptCategory::Table)
            .map(|s| s.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["01_x.sql", "02_y.sql", "10_z.SQL"]);
    }

    #[test]
    fn test_missing_category_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("Tables"), "T.sql", "CREATE TABLE T (ID INTEGER);");

        let set = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.category(ScriptCategory::Domain).count(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let domains = dir.path().join("Domains");
        fs::create_dir_all(&domains).unwrap();
        fs::write(domains.join("bad.sql"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let err = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptsError::InvalidUtf8(_)));
    }

    #[test]
    fn test_bom_is_stripped_and_statements_split() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("Domains"),
            "D.sql",
            "\u{feff}CREATE DOMAIN A AS INTEGER;\nCREATE DOMAIN B AS DATE;\n",
        );

        let set = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap();
        let statements = set.scripts()[0].statements().into_vec();
        assert_eq!(
            statements,
            vec!["CREATE DOMAIN A AS INTEGER", "CREATE DOMAIN B AS DATE"]
        );
    }
}
