//! Pure building blocks for dictionary-driven schema scripts.
//!
//! This crate holds everything that needs no I/O:
//!
//! - [`ScriptCategory`]: the fixed Domain → Table → Procedure order used
//!   for both execution and export.
//! - [`decode`] / [`RawField`]: maps the dictionary's numeric type
//!   descriptors to a canonical [`FieldType`].
//! - [`split_script`]: splits script text into a [`StatementBatch`],
//!   honoring `SET TERM` terminator switches.
//! - [`render_domain`], [`render_table`], [`render_procedure`]: regenerate
//!   DDL from [`DomainDescriptor`], [`TableDescriptor`] and
//!   [`ProcedureDescriptor`].
//!
//! # Example
//!
//! ```
//! use dbmeta_core::*;
//!
//! let table = TableDescriptor::new("CUSTOMERS")
//!     .with_column(ColumnDescriptor::new("ID", decode(8, None, 4, 0, 0)).not_null())
//!     .with_column(ColumnDescriptor::new("NAME", decode(37, Some(0), 400, 100, 0)));
//!
//! let ddl = render_table(&table);
//! let batch = split_script(&ddl);
//! assert_eq!(batch.len(), 1);
//! assert!(batch.iter().next().unwrap().starts_with("CREATE TABLE CUSTOMERS"));
//! ```

mod ddl;
mod decode;
mod split;
mod types;

pub use ddl::{
    PROCEDURE_TERMINATOR, procedure_statement, render_domain, render_procedure, render_table,
    script_file_stem,
};
pub use decode::{RawField, decode};
pub use split::{DEFAULT_TERMINATOR, split_script};
pub use types::*;
