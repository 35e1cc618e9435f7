//! Catalog access, schema introspection and script execution.
//!
//! This crate connects the pure pieces of [`dbmeta_core`] and the script
//! tree of [`dbmeta_scripts`] to a live catalog.
//!
//! # Architecture
//!
//! - **`catalog`**: the [`Catalog`] interface, [`CatalogBackend`] and typed row access
//! - **`firebird`**: [`FirebirdCatalog`], the Firebird wire protocol transport
//! - **`sqlite`**: [`SqliteCatalog`], the rusqlite transport
//! - **`connection`**: connection string parsing
//! - **`reader`**: [`SchemaReader`] over the `RDB$` dictionary tables
//! - **`runner`**: [`ScriptRunner`], one transaction per script file
//! - **`workflow`**: build, export and update
//!
//! # Quick start
//!
//! ```no_run
//! use dbmeta_catalog::{ConnectionString, FirebirdCatalog, build_database, export_scripts};
//! use dbmeta_scripts::ToolConfig;
//!
//! let config = ToolConfig::default();
//! let build = build_database::<FirebirdCatalog>("db/", "schema/", &config).unwrap();
//! println!("{} files applied", build.run.files());
//!
//! let conn = ConnectionString::for_path(&build.database);
//! let export = export_scripts::<FirebirdCatalog>(&conn, "exported/", &config, "1.0.0").unwrap();
//! println!("{} files exported", export.total());
//! ```

mod catalog;
mod connection;
mod error;
mod firebird;
mod reader;
mod runner;
mod sqlite;
mod workflow;

pub use catalog::{Catalog, CatalogBackend, CatalogRow, FromCatalogRow};
pub use connection::ConnectionString;
pub use error::{CatalogError, Result};
pub use firebird::{FirebirdCatalog, FirebirdOptions};
pub use reader::{ColumnRow, DomainRow, ParameterRow, ProcedureRow, RelationRow, SchemaReader};
pub use runner::{CategoryCounts, RunOptions, RunReport, ScriptRunner};
pub use sqlite::SqliteCatalog;
pub use workflow::{
    BuildReport, ExportReport, build_database, database_path, export_catalog, export_scripts,
    run_scripts, update_database,
};
