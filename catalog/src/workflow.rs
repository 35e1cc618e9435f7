//! The three user-facing workflows: build, export and update.
//!
//! Each workflow owns its catalog connection for the duration of the call;
//! the connection is released when the function returns, on success and on
//! error alike. The transport is a type parameter, e.g.
//! `build_database::<FirebirdCatalog>(..)`.

use std::path::{Path, PathBuf};

use dbmeta_core::{
    ScriptCategory, render_domain, render_procedure, render_table, script_file_stem,
};
use dbmeta_scripts::{ExportManifest, ExportWriter, MANIFEST_FILE, ScriptSet, ToolConfig};

use crate::catalog::{Catalog, CatalogBackend};
use crate::connection::ConnectionString;
use crate::error::{CatalogError, Result};
use crate::reader::SchemaReader;
use crate::runner::{RunOptions, RunReport, ScriptRunner};

/// Result of [`build_database`].
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Path of the created catalog file.
    pub database: PathBuf,
    pub run: RunReport,
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub root: PathBuf,
    pub manifest: ExportManifest,
}

impl ExportReport {
    /// Number of files written for a category.
    pub fn count(&self, category: ScriptCategory) -> usize {
        self.manifest.count(category)
    }

    pub fn total(&self) -> usize {
        self.manifest.entries.len()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }
}

/// Path of the catalog file `build_database` creates in `db_dir`.
pub fn database_path(db_dir: &Path, config: &ToolConfig) -> PathBuf {
    db_dir.join(&config.database_file)
}

/// Creates a fresh catalog in `db_dir` and runs every script under
/// `scripts_dir` against it.
///
/// Scripts are read before anything on disk changes. `db_dir` is created
/// if missing and an existing catalog file in it is deleted first.
pub fn build_database<B: CatalogBackend>(
    db_dir: impl AsRef<Path>,
    scripts_dir: impl AsRef<Path>,
    config: &ToolConfig,
) -> Result<BuildReport> {
    let db_dir = db_dir.as_ref();
    let scripts = ScriptSet::from_dir(scripts_dir, config)?;

    std::fs::create_dir_all(db_dir).map_err(|e| CatalogError::io(db_dir, e))?;
    let database = database_path(db_dir, config);
    if database.exists() {
        tracing::info!(path = %database.display(), "removing existing catalog");
        std::fs::remove_file(&database).map_err(|e| CatalogError::io(&database, e))?;
    }

    let mut catalog = B::create(&ConnectionString::for_path(&database), config.page_size)?;
    let run = run_scripts(&mut catalog, &scripts, RunOptions::default())?;
    Ok(BuildReport { database, run })
}

/// Runs every script under `scripts_dir` against an existing catalog.
///
/// # Errors
///
/// A missing `scripts_dir` fails with
/// [`ScriptsError::DirectoryNotFound`](dbmeta_scripts::ScriptsError::DirectoryNotFound)
/// before the catalog is opened.
pub fn update_database<B: CatalogBackend>(
    conn: &ConnectionString,
    scripts_dir: impl AsRef<Path>,
    config: &ToolConfig,
) -> Result<RunReport> {
    let scripts = ScriptSet::from_dir(scripts_dir, config)?;
    let mut catalog = B::open(conn)?;
    tracing::info!(catalog = %conn, scripts = scripts.len(), "updating catalog");
    run_scripts(&mut catalog, &scripts, RunOptions::default())
}

/// Exports the schema of the catalog named by `conn` into `out_dir`.
pub fn export_scripts<B: CatalogBackend>(
    conn: &ConnectionString,
    out_dir: impl AsRef<Path>,
    config: &ToolConfig,
    tool_version: &str,
) -> Result<ExportReport> {
    let mut catalog = B::open(conn)?;
    tracing::info!(catalog = %conn, "exporting schema");
    export_catalog(&mut catalog, out_dir, config, tool_version)
}

/// Runs a loaded script set against any catalog.
pub fn run_scripts<C: Catalog>(
    catalog: &mut C,
    scripts: &ScriptSet,
    options: RunOptions,
) -> Result<RunReport> {
    ScriptRunner::with_options(catalog, options).run(scripts)
}

/// Exports the schema of any catalog.
///
/// All three listings are read before the first file is written, so a
/// catalog failure leaves `out_dir` untouched.
pub fn export_catalog<C: Catalog>(
    catalog: &mut C,
    out_dir: impl AsRef<Path>,
    config: &ToolConfig,
    tool_version: &str,
) -> Result<ExportReport> {
    let mut reader = SchemaReader::new(catalog, config.system_prefix.clone());
    let domains = reader.list_domains()?;
    let tables = reader.list_tables()?;
    let procedures = reader.list_procedures()?;

    let mut writer = ExportWriter::create(out_dir, config, tool_version)?;
    for domain in &domains {
        let stem = script_file_stem(ScriptCategory::Domain, &domain.name, None);
        writer.write(ScriptCategory::Domain, &domain.name, &stem, &render_domain(domain))?;
    }
    for table in &tables {
        let stem = script_file_stem(ScriptCategory::Table, &table.name, None);
        writer.write(ScriptCategory::Table, &table.name, &stem, &render_table(table))?;
    }
    for procedure in &procedures {
        let stem = script_file_stem(ScriptCategory::Procedure, &procedure.name, Some(procedure.id));
        writer.write(
            ScriptCategory::Procedure,
            &procedure.name,
            &stem,
            &render_procedure(procedure),
        )?;
    }

    let root = writer.root().to_path_buf();
    let manifest = writer.finish()?;
    tracing::info!(
        domains = domains.len(),
        tables = tables.len(),
        procedures = procedures.len(),
        "export complete"
    );
    Ok(ExportReport { root, manifest })
}
