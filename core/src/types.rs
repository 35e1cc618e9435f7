//! Schema descriptor definitions.
//!
//! This module defines the data model shared by the reader, the DDL writer
//! and the script runner: the fixed script categories, the decoded field
//! types, and one descriptor per exportable entity (domain, table,
//! procedure).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a schema script.
///
/// Categories have a fixed total order (`Domain < Table < Procedure`) that
/// reflects dependency order: tables reference domains, procedures reference
/// tables and domains. Both execution and export follow this order.
///
/// # Examples
///
/// ```
/// use dbmeta_core::ScriptCategory;
///
/// assert!(ScriptCategory::Domain < ScriptCategory::Table);
/// assert_eq!(ScriptCategory::Procedure.dir_name(), "Procedures");
/// assert_eq!("Tables".parse::<ScriptCategory>().unwrap(), ScriptCategory::Table);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScriptCategory {
    /// Named, reusable column types.
    Domain,
    /// Tables with their columns.
    Table,
    /// Stored procedures.
    Procedure,
}

impl ScriptCategory {
    /// All categories in execution order.
    pub const ALL: [ScriptCategory; 3] = [
        ScriptCategory::Domain,
        ScriptCategory::Table,
        ScriptCategory::Procedure,
    ];

    /// Name of the sub-directory holding scripts of this category.
    pub fn dir_name(self) -> &'static str {
        match self {
            ScriptCategory::Domain => "Domains",
            ScriptCategory::Table => "Tables",
            ScriptCategory::Procedure => "Procedures",
        }
    }
}

impl fmt::Display for ScriptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returned when a directory name does not name a [`ScriptCategory`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown script category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ScriptCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptCategory::ALL
            .into_iter()
            .find(|category| category.dir_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Decoded type of a column, domain or procedure parameter.
///
/// The `Display` impl yields the canonical textual declaration used in
/// generated DDL (e.g. `VARCHAR(50)`, `NUMERIC(10, 2)`).
///
/// # Examples
///
/// ```
/// use dbmeta_core::FieldType;
///
/// assert_eq!(FieldType::Varchar(50).to_string(), "VARCHAR(50)");
/// assert_eq!(FieldType::Numeric { precision: 10, scale: 2 }.to_string(), "NUMERIC(10, 2)");
/// assert_eq!(FieldType::Unknown { code: Some(9999) }.to_string(), "UNKNOWN");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    SmallInt,
    Integer,
    BigInt,
    Float,
    DoublePrecision,
    Date,
    Time,
    Timestamp,
    /// Fixed-length character type with its length in characters.
    Char(i64),
    /// Variable-length character type with its length in characters.
    Varchar(i64),
    Numeric { precision: i64, scale: i64 },
    Decimal { precision: i64, scale: i64 },
    Blob,
    /// Text blob (`BLOB SUB_TYPE TEXT`).
    BlobText,
    /// Type code not covered by the decoder; keeps the raw code for reporting.
    Unknown { code: Option<i64> },
}

impl FieldType {
    /// Returns `true` for the [`FieldType::Unknown`] fallback.
    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldType::Unknown { .. })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::SmallInt => f.write_str("SMALLINT"),
            FieldType::Integer => f.write_str("INTEGER"),
            FieldType::BigInt => f.write_str("BIGINT"),
            FieldType::Float => f.write_str("FLOAT"),
            FieldType::DoublePrecision => f.write_str("DOUBLE PRECISION"),
            FieldType::Date => f.write_str("DATE"),
            FieldType::Time => f.write_str("TIME"),
            FieldType::Timestamp => f.write_str("TIMESTAMP"),
            FieldType::Char(len) => write!(f, "CHAR({len})"),
            FieldType::Varchar(len) => write!(f, "VARCHAR({len})"),
            FieldType::Numeric { precision, scale } => write!(f, "NUMERIC({precision}, {scale})"),
            FieldType::Decimal { precision, scale } => write!(f, "DECIMAL({precision}, {scale})"),
            FieldType::Blob => f.write_str("BLOB"),
            FieldType::BlobText => f.write_str("BLOB SUB_TYPE TEXT"),
            FieldType::Unknown { .. } => f.write_str("UNKNOWN"),
        }
    }
}

/// A user-defined domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

/// One column of a table, in stored field position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// `false` when the dictionary carries a not-null flag for the column.
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Creates a nullable column.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }

    /// Marks the column as `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A table and its columns.
///
/// Column order is positional and must be preserved exactly.
///
/// # Examples
///
/// ```
/// use dbmeta_core::{ColumnDescriptor, FieldType, TableDescriptor};
///
/// let table = TableDescriptor::new("T")
///     .with_column(ColumnDescriptor::new("ID", FieldType::Integer).not_null())
///     .with_column(ColumnDescriptor::new("NAME", FieldType::Varchar(50)));
/// assert_eq!(table.columns[0].name, "ID");
/// assert!(table.columns[1].nullable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Creates a table without columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column after the existing ones.
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }
}

/// A procedure input or output parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A stored procedure.
///
/// `inputs` and `outputs` keep the dictionary's ordinal order; `body` is the
/// stored source text following `AS`, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDescriptor {
    pub name: String,
    /// Dictionary-assigned numeric identifier, used in exported file names.
    pub id: i64,
    pub inputs: Vec<ParameterDescriptor>,
    pub outputs: Vec<ParameterDescriptor>,
    pub body: String,
}

impl ProcedureDescriptor {
    /// Creates a procedure without parameters.
    pub fn new(name: impl Into<String>, id: i64, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_input(mut self, param: ParameterDescriptor) -> Self {
        self.inputs.push(param);
        self
    }

    pub fn with_output(mut self, param: ParameterDescriptor) -> Self {
        self.outputs.push(param);
        self
    }
}

/// Ordered statements produced by splitting one script.
///
/// Insertion order is semantically required: later statements may depend
/// on earlier ones in the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBatch {
    statements: Vec<String>,
}

impl StatementBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement at the end of the batch.
    pub fn push(&mut self, statement: String) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.statements
    }
}

impl<'a> IntoIterator for &'a StatementBatch {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_dependency_order() {
        let mut shuffled = vec![
            ScriptCategory::Procedure,
            ScriptCategory::Domain,
            ScriptCategory::Table,
        ];
        shuffled.sort();
        assert_eq!(shuffled, ScriptCategory::ALL.to_vec());
    }

    #[test]
    fn test_category_from_dir_name() {
        assert_eq!("Domains".parse::<ScriptCategory>(), Ok(ScriptCategory::Domain));
        assert_eq!("procedures".parse::<ScriptCategory>(), Ok(ScriptCategory::Procedure));
        assert!("Views".parse::<ScriptCategory>().is_err());
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::DoublePrecision.to_string(), "DOUBLE PRECISION");
        assert_eq!(FieldType::Char(10).to_string(), "CHAR(10)");
        assert_eq!(
            FieldType::Decimal { precision: 4, scale: 0 }.to_string(),
            "DECIMAL(4, 0)"
        );
        assert_eq!(FieldType::BlobText.to_string(), "BLOB SUB_TYPE TEXT");
        assert_eq!(FieldType::Unknown { code: None }.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_statement_batch_preserves_order() {
        let mut batch = StatementBatch::new();
        batch.push("A".into());
        batch.push("B".into());
        assert_eq!(batch.iter().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(batch.len(), 2);
    }
}
