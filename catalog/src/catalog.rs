//! The catalog collaborator interface.
//!
//! Workflows never talk to a database driver directly. They go through
//! [`Catalog`], which covers exactly what they need: run a statement, run
//! a query with positional parameters, and drive one transaction at a time.
//!
//! Query results are not accessed by column name. Each query has a fixed
//! row struct implementing [`FromCatalogRow`], populated by position from a
//! [`CatalogRow`] and validated once at this boundary.

use crate::connection::ConnectionString;
use crate::error::{CatalogError, Result};

/// Positional, typed access to one result row.
pub trait CatalogRow {
    /// Number of columns in the row.
    fn column_count(&self) -> usize;

    /// Reads an integer column; `None` for SQL NULL.
    fn get_i64(&self, index: usize) -> Result<Option<i64>>;

    /// Reads a text column; `None` for SQL NULL.
    fn get_text(&self, index: usize) -> Result<Option<String>>;

    /// Reads a text column that must not be NULL.
    fn require_text(&self, index: usize) -> Result<String> {
        self.get_text(index)?
            .ok_or_else(|| CatalogError::RowShape(format!("column {index} is NULL")))
    }

    /// Reads an integer column that must not be NULL.
    fn require_i64(&self, index: usize) -> Result<i64> {
        self.get_i64(index)?
            .ok_or_else(|| CatalogError::RowShape(format!("column {index} is NULL")))
    }
}

/// A statically-typed row shape for one query.
pub trait FromCatalogRow: Sized {
    /// Minimum number of columns the query must return.
    const COLUMNS: usize;

    fn from_row(row: &dyn CatalogRow) -> Result<Self>;

    /// Checks the column count, then builds the row.
    fn from_checked_row(row: &dyn CatalogRow) -> Result<Self> {
        if row.column_count() < Self::COLUMNS {
            return Err(CatalogError::RowShape(format!(
                "expected {} columns, got {}",
                Self::COLUMNS,
                row.column_count()
            )));
        }
        Self::from_row(row)
    }
}

/// Connection to a catalog.
///
/// Implementations own one connection; dropping the value releases it.
/// At most one transaction is open at a time and transactions do not nest.
pub trait Catalog {
    /// Executes a statement that returns no rows.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a query with positional `?` parameters and maps every row.
    fn query<R: FromCatalogRow>(&mut self, sql: &str, params: &[&str]) -> Result<Vec<R>>;

    /// Opens a transaction.
    fn begin(&mut self) -> Result<()>;

    /// Commits the open transaction.
    fn commit(&mut self) -> Result<()>;

    /// Rolls back the open transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Returns `true` while a transaction is open.
    fn in_transaction(&self) -> bool;
}

/// A catalog transport the workflows can create and open by themselves.
///
/// `build_database`, `update_database` and `export_scripts` are generic
/// over this trait; the caller picks the transport.
pub trait CatalogBackend: Catalog + Sized {
    /// Creates a new, empty catalog and connects to it.
    fn create(conn: &ConnectionString, page_size: u32) -> Result<Self>;

    /// Connects to an existing catalog. Never creates one.
    fn open(conn: &ConnectionString) -> Result<Self>;
}
