//! Filesystem side of the schema script tools.
//!
//! This crate reads and writes script trees: a root directory with one
//! sub-directory per [`ScriptCategory`](dbmeta_core::ScriptCategory):
//!
//! ```text
//! scripts/
//! ├── Domains/      CREATE DOMAIN ...
//! ├── Tables/       CREATE TABLE ...
//! └── Procedures/   SET TERM ^ ; CREATE OR ALTER PROCEDURE ...
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use dbmeta_scripts::{ScriptSet, ToolConfig};
//!
//! let config = ToolConfig::from_env().unwrap();
//! let set = ScriptSet::from_dir("scripts/", &config).unwrap();
//! for script in set.scripts() {
//!     println!("{}: {} statement(s)", script.file_name, script.statements().len());
//! }
//! ```

mod config;
mod error;
mod loader;
mod manifest;
mod writer;

pub use config::{Backend, CONFIG_ENV_VAR, ToolConfig};
pub use error::{Result, ScriptsError};
pub use loader::{RawScript, ScriptSet, list_scripts};
pub use manifest::{ExportEntry, ExportManifest, MANIFEST_FILE};
pub use writer::ExportWriter;
