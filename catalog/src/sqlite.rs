//! SQLite transport for the [`Catalog`] interface.
//!
//! [`SqliteCatalog`] owns one [`rusqlite::Connection`]. Transactions are
//! driven with plain `BEGIN`/`COMMIT`/`ROLLBACK` so that the connection
//! stays in autocommit mode between script files.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params_from_iter};

use crate::catalog::{Catalog, CatalogBackend, CatalogRow, FromCatalogRow};
use crate::connection::ConnectionString;
use crate::error::{CatalogError, Result};

/// A catalog stored in an SQLite database file.
///
/// # Examples
///
/// ```
/// use dbmeta_catalog::{Catalog, SqliteCatalog};
///
/// let mut catalog = SqliteCatalog::open_in_memory().unwrap();
/// catalog.begin().unwrap();
/// catalog.execute("CREATE TABLE T (ID INTEGER)").unwrap();
/// catalog.commit().unwrap();
/// assert!(!catalog.in_transaction());
/// ```
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Creates a new, empty catalog file.
    ///
    /// # Errors
    ///
    /// Fails with [`CatalogError::IoError`] if the file already exists; the
    /// caller decides whether to delete it first.
    pub fn create(conn: &ConnectionString, page_size: u32) -> Result<Self> {
        let path = conn.database();
        if path.exists() {
            return Err(CatalogError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "catalog file already exists",
                ),
            ));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(path, flags)?;
        // Page size and encoding only take effect before the first write,
        // and writing the user version is what materializes the header.
        connection.execute_batch(&format!(
            "PRAGMA page_size = {page_size};\n\
             PRAGMA encoding = 'UTF-8';\n\
             PRAGMA user_version = 1;"
        ))?;
        tracing::info!(path = %path.display(), page_size, "created catalog");
        Ok(Self { conn: connection })
    }

    /// Opens an existing catalog. Never creates one.
    pub fn open(conn: &ConnectionString) -> Result<Self> {
        let path = conn.database();
        if !path.is_file() {
            return Err(CatalogError::CatalogNotFound(path.to_path_buf()));
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(path, flags)?;
        tracing::debug!(path = %path.display(), "opened catalog");
        Ok(Self { conn: connection })
    }

    /// Opens a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Path of the underlying database file, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.conn.path().filter(|p| !p.is_empty()).map(Path::new)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CatalogBackend for SqliteCatalog {
    fn create(conn: &ConnectionString, page_size: u32) -> Result<Self> {
        SqliteCatalog::create(conn, page_size)
    }

    fn open(conn: &ConnectionString) -> Result<Self> {
        SqliteCatalog::open(conn)
    }
}

impl Catalog for SqliteCatalog {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query<R: FromCatalogRow>(&mut self, sql: &str, params: &[&str]) -> Result<Vec<R>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let row = SqliteRow { row, columns };
            out.push(R::from_checked_row(&row)?);
        }
        Ok(out)
    }

    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

struct SqliteRow<'a, 'stmt> {
    row: &'a rusqlite::Row<'stmt>,
    columns: usize,
}

impl CatalogRow for SqliteRow<'_, '_> {
    fn column_count(&self) -> usize {
        self.columns
    }

    // Dictionary columns are loosely typed in SQLite; integers stored as
    // text are accepted as long as they parse.
    fn get_i64(&self, index: usize) -> Result<Option<i64>> {
        match self.row.get_ref(index)? {
            ValueRef::Null => Ok(None),
            ValueRef::Integer(v) => Ok(Some(v)),
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| CatalogError::RowShape(format!("column {index}: {e}")))?;
                text.trim().parse().map(Some).map_err(|_| {
                    CatalogError::RowShape(format!("column {index}: '{text}' is not an integer"))
                })
            }
            ValueRef::Real(v) => Err(CatalogError::RowShape(format!(
                "column {index}: expected integer, got {v}"
            ))),
            ValueRef::Blob(_) => Err(CatalogError::RowShape(format!(
                "column {index}: expected integer, got blob"
            ))),
        }
    }

    fn get_text(&self, index: usize) -> Result<Option<String>> {
        match self.row.get_ref(index)? {
            ValueRef::Null => Ok(None),
            ValueRef::Integer(v) => Ok(Some(v.to_string())),
            ValueRef::Real(v) => Ok(Some(v.to_string())),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| CatalogError::RowShape(format!("column {index}: {e}"))),
        }
    }
}
