//! Firebird transport for the [`Catalog`] interface.
//!
//! [`FirebirdCatalog`] talks to a Firebird server over the wire protocol
//! with the pure Rust client of `rsfbclient`, so no native client library
//! is needed. Server, credentials and charset come from the connection
//! string; missing keys fall back to the stock server defaults
//! (`localhost:3050`, `SYSDBA`/`masterkey`, `UTF8`).

use rsfbclient::prelude::*;
use rsfbclient::{Connection, FbError, Row, SqlType, charset};
use rsfbclient_core::FirebirdClient;

use crate::catalog::{Catalog, CatalogBackend, CatalogRow, FromCatalogRow};
use crate::connection::ConnectionString;
use crate::error::{CatalogError, Result};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3050;
const DEFAULT_USER: &str = "SYSDBA";
const DEFAULT_PASSWORD: &str = "masterkey";

/// Server attachment settings taken from a [`ConnectionString`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebirdOptions {
    pub host: String,
    pub port: u16,
    /// Database path as seen by the server.
    pub database: String,
    pub user: String,
    pub password: String,
}

impl FirebirdOptions {
    /// Reads `DataSource`, `Port`, `User`/`UserID`, `Password` and
    /// `Charset` from `conn`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidConnectionString`] for a port that is
    /// not a number or a charset other than UTF-8.
    pub fn from_connection(conn: &ConnectionString) -> Result<Self> {
        let port = match conn.option("port") {
            Some(raw) => raw.parse().map_err(|_| {
                CatalogError::InvalidConnectionString(format!("invalid port '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };
        if let Some(cs) = conn.option("charset") {
            if !cs.eq_ignore_ascii_case("utf8") && !cs.eq_ignore_ascii_case("utf-8") {
                return Err(CatalogError::InvalidConnectionString(format!(
                    "unsupported charset '{cs}'"
                )));
            }
        }

        Ok(Self {
            host: conn.data_source().unwrap_or(DEFAULT_HOST).to_string(),
            port,
            database: conn.database().display().to_string(),
            user: conn
                .option("user")
                .or_else(|| conn.option("userid"))
                .or_else(|| conn.option("user id"))
                .unwrap_or(DEFAULT_USER)
                .to_string(),
            password: conn.option("password").unwrap_or(DEFAULT_PASSWORD).to_string(),
        })
    }
}

/// The subset of an `rsfbclient` connection the catalog uses, with the
/// client type erased.
trait FirebirdConnection {
    fn execute_statement(&mut self, sql: &str) -> std::result::Result<(), FbError>;
    fn query_rows(
        &mut self,
        sql: &str,
        params: Vec<SqlType>,
    ) -> std::result::Result<Vec<Row>, FbError>;
    fn begin(&mut self) -> std::result::Result<(), FbError>;
    fn commit(&mut self) -> std::result::Result<(), FbError>;
    fn rollback(&mut self) -> std::result::Result<(), FbError>;
}

impl<C: FirebirdClient + 'static> FirebirdConnection for Connection<C> {
    fn execute_statement(&mut self, sql: &str) -> std::result::Result<(), FbError> {
        self.execute(sql, ()).map(|_| ())
    }

    fn query_rows(
        &mut self,
        sql: &str,
        params: Vec<SqlType>,
    ) -> std::result::Result<Vec<Row>, FbError> {
        self.query(sql, params)
    }

    fn begin(&mut self) -> std::result::Result<(), FbError> {
        self.begin_transaction()
    }

    fn commit(&mut self) -> std::result::Result<(), FbError> {
        Connection::commit(self)
    }

    fn rollback(&mut self) -> std::result::Result<(), FbError> {
        Connection::rollback(self)
    }
}

/// A catalog served by a Firebird server.
///
/// Outside [`begin`](Catalog::begin)/[`commit`](Catalog::commit) every
/// statement runs in its own autocommitted transaction.
pub struct FirebirdCatalog {
    conn: Box<dyn FirebirdConnection>,
    options: FirebirdOptions,
    in_transaction: bool,
}

impl FirebirdCatalog {
    /// Attaches to the server; with a page size a new database is created
    /// instead.
    fn attach(options: FirebirdOptions, page_size: Option<u32>) -> Result<Self> {
        let mut builder = rsfbclient::builder_pure_rust();
        builder
            .host(options.host.as_str())
            .port(options.port)
            .db_name(options.database.as_str())
            .user(options.user.as_str())
            .pass(options.password.as_str())
            .charset(charset::UTF_8);

        let conn: Box<dyn FirebirdConnection> = match page_size {
            Some(page_size) => {
                builder.page_size(page_size);
                let conn = builder.create_database()?;
                tracing::info!(
                    host = %options.host,
                    database = %options.database,
                    page_size,
                    "created catalog"
                );
                Box::new(conn)
            }
            None => {
                let conn = builder.connect()?;
                tracing::debug!(
                    host = %options.host,
                    database = %options.database,
                    "opened catalog"
                );
                Box::new(conn)
            }
        };
        Ok(Self {
            conn,
            options,
            in_transaction: false,
        })
    }

    pub fn options(&self) -> &FirebirdOptions {
        &self.options
    }
}

impl CatalogBackend for FirebirdCatalog {
    fn create(conn: &ConnectionString, page_size: u32) -> Result<Self> {
        Self::attach(FirebirdOptions::from_connection(conn)?, Some(page_size))
    }

    fn open(conn: &ConnectionString) -> Result<Self> {
        Self::attach(FirebirdOptions::from_connection(conn)?, None)
    }
}

impl Catalog for FirebirdCatalog {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_statement(sql)?;
        Ok(())
    }

    fn query<R: FromCatalogRow>(&mut self, sql: &str, params: &[&str]) -> Result<Vec<R>> {
        let params = params
            .iter()
            .map(|p| SqlType::Text((*p).to_string()))
            .collect();
        self.conn
            .query_rows(sql, params)?
            .into_iter()
            .map(|row| {
                let values: Vec<SqlType> = row.cols.into_iter().map(|col| col.value).collect();
                R::from_checked_row(&FirebirdRow(&values))
            })
            .collect()
    }

    fn begin(&mut self) -> Result<()> {
        self.conn.begin()?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.commit()?;
        self.in_transaction = false;
        Ok(())
    }

    // The transaction is gone even when the server reports a failure.
    fn rollback(&mut self) -> Result<()> {
        self.in_transaction = false;
        self.conn.rollback()?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

struct FirebirdRow<'a>(&'a [SqlType]);

impl FirebirdRow<'_> {
    fn value(&self, index: usize) -> Result<&SqlType> {
        self.0
            .get(index)
            .ok_or_else(|| CatalogError::RowShape(format!("no column {index}")))
    }
}

impl CatalogRow for FirebirdRow<'_> {
    fn column_count(&self) -> usize {
        self.0.len()
    }

    fn get_i64(&self, index: usize) -> Result<Option<i64>> {
        match self.value(index)? {
            SqlType::Null => Ok(None),
            SqlType::Integer(v) => Ok(Some(*v)),
            SqlType::Text(text) => text.trim().parse().map(Some).map_err(|_| {
                CatalogError::RowShape(format!("column {index}: '{text}' is not an integer"))
            }),
            other => Err(CatalogError::RowShape(format!(
                "column {index}: expected integer, got {other:?}"
            ))),
        }
    }

    // Text blobs such as procedure sources arrive as binary.
    fn get_text(&self, index: usize) -> Result<Option<String>> {
        match self.value(index)? {
            SqlType::Null => Ok(None),
            SqlType::Text(text) => Ok(Some(text.clone())),
            SqlType::Integer(v) => Ok(Some(v.to_string())),
            SqlType::Floating(v) => Ok(Some(v.to_string())),
            SqlType::Binary(bytes) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|e| CatalogError::RowShape(format!("column {index}: {e}"))),
            other => Err(CatalogError::RowShape(format!(
                "column {index}: expected text, got {other:?}"
            ))),
        }
    }
}
