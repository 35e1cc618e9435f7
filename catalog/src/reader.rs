//! Schema introspection over the `RDB$` dictionary tables.
//!
//! [`SchemaReader`] lists user domains, tables and stored procedures as
//! descriptors. Each listing is all-or-nothing: the first failing query
//! aborts it and the error is returned unchanged.

use dbmeta_core::{
    ColumnDescriptor, DomainDescriptor, FieldType, ParameterDescriptor, ProcedureDescriptor,
    RawField, TableDescriptor,
};

use crate::catalog::{Catalog, CatalogRow, FromCatalogRow};
use crate::error::Result;

const DOMAINS_SQL: &str = "
SELECT TRIM(f.RDB$FIELD_NAME),
       f.RDB$FIELD_TYPE,
       f.RDB$FIELD_SUB_TYPE,
       f.RDB$FIELD_LENGTH,
       f.RDB$CHARACTER_LENGTH,
       f.RDB$FIELD_SCALE
FROM RDB$FIELDS f
WHERE COALESCE(f.RDB$SYSTEM_FLAG, 0) = 0
  AND f.RDB$FIELD_NAME NOT LIKE ?
ORDER BY f.RDB$FIELD_NAME";

const RELATIONS_SQL: &str = "
SELECT TRIM(RDB$RELATION_NAME)
FROM RDB$RELATIONS
WHERE COALESCE(RDB$SYSTEM_FLAG, 0) = 0
  AND RDB$VIEW_BLR IS NULL
ORDER BY RDB$RELATION_NAME";

const COLUMNS_SQL: &str = "
SELECT TRIM(r.RDB$FIELD_NAME),
       f.RDB$FIELD_TYPE,
       f.RDB$FIELD_SUB_TYPE,
       f.RDB$FIELD_LENGTH,
       f.RDB$CHARACTER_LENGTH,
       f.RDB$FIELD_SCALE,
       COALESCE(r.RDB$NULL_FLAG, f.RDB$NULL_FLAG)
FROM RDB$RELATION_FIELDS r
JOIN RDB$FIELDS f ON TRIM(f.RDB$FIELD_NAME) = TRIM(r.RDB$FIELD_SOURCE)
WHERE TRIM(r.RDB$RELATION_NAME) = ?
ORDER BY r.RDB$FIELD_POSITION";

const PROCEDURES_SQL: &str = "
SELECT TRIM(RDB$PROCEDURE_NAME),
       RDB$PROCEDURE_SOURCE,
       RDB$PROCEDURE_ID
FROM RDB$PROCEDURES
WHERE COALESCE(RDB$SYSTEM_FLAG, 0) = 0
ORDER BY RDB$PROCEDURE_NAME";

const PARAMETERS_SQL: &str = "
SELECT TRIM(p.RDB$PARAMETER_NAME),
       p.RDB$PARAMETER_TYPE,
       f.RDB$FIELD_TYPE,
       f.RDB$FIELD_SUB_TYPE,
       f.RDB$FIELD_LENGTH,
       f.RDB$CHARACTER_LENGTH,
       f.RDB$FIELD_SCALE
FROM RDB$PROCEDURE_PARAMETERS p
JOIN RDB$FIELDS f ON TRIM(p.RDB$FIELD_SOURCE) = TRIM(f.RDB$FIELD_NAME)
WHERE TRIM(p.RDB$PROCEDURE_NAME) = ?
ORDER BY p.RDB$PARAMETER_TYPE, p.RDB$PARAMETER_NUMBER";

/// Parameter direction value for outputs in `RDB$PARAMETER_TYPE`.
const OUTPUT_PARAMETER: i64 = 1;

/// Reads the five field-descriptor columns starting at `first`.
fn raw_field(row: &dyn CatalogRow, first: usize) -> Result<RawField> {
    Ok(RawField {
        field_type: row.get_i64(first)?,
        sub_type: row.get_i64(first + 1)?,
        length: row.get_i64(first + 2)?,
        char_length: row.get_i64(first + 3)?,
        scale: row.get_i64(first + 4)?,
    })
}

/// One row of the domain listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRow {
    pub name: String,
    pub field: RawField,
}

impl FromCatalogRow for DomainRow {
    const COLUMNS: usize = 6;

    fn from_row(row: &dyn CatalogRow) -> Result<Self> {
        Ok(Self {
            name: row.require_text(0)?,
            field: raw_field(row, 1)?,
        })
    }
}

/// One row of the table listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
    pub name: String,
}

impl FromCatalogRow for RelationRow {
    const COLUMNS: usize = 1;

    fn from_row(row: &dyn CatalogRow) -> Result<Self> {
        Ok(Self {
            name: row.require_text(0)?,
        })
    }
}

/// One column of a table, in stored position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: String,
    pub field: RawField,
    /// Column-level flag, falling back to the domain's. `None` means nullable.
    pub null_flag: Option<i64>,
}

impl FromCatalogRow for ColumnRow {
    const COLUMNS: usize = 7;

    fn from_row(row: &dyn CatalogRow) -> Result<Self> {
        Ok(Self {
            name: row.require_text(0)?,
            field: raw_field(row, 1)?,
            null_flag: row.get_i64(6)?,
        })
    }
}

/// One row of the procedure listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRow {
    pub name: String,
    pub source: Option<String>,
    pub id: i64,
}

impl FromCatalogRow for ProcedureRow {
    const COLUMNS: usize = 3;

    fn from_row(row: &dyn CatalogRow) -> Result<Self> {
        Ok(Self {
            name: row.require_text(0)?,
            source: row.get_text(1)?,
            id: row.require_i64(2)?,
        })
    }
}

/// One procedure parameter, ordered by direction then ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRow {
    pub name: String,
    /// `0` for inputs, `1` for outputs.
    pub direction: i64,
    pub field: RawField,
}

impl FromCatalogRow for ParameterRow {
    const COLUMNS: usize = 7;

    fn from_row(row: &dyn CatalogRow) -> Result<Self> {
        Ok(Self {
            name: row.require_text(0)?,
            direction: row.require_i64(1)?,
            field: raw_field(row, 2)?,
        })
    }
}

/// Reads schema descriptors from a catalog.
///
/// # Examples
///
/// ```
/// use dbmeta_catalog::{Catalog, SchemaReader, SqliteCatalog};
///
/// let mut catalog = SqliteCatalog::open_in_memory().unwrap();
/// catalog
///     .execute(
///         "CREATE TABLE RDB$FIELDS (RDB$FIELD_NAME CHAR(63), RDB$FIELD_TYPE INTEGER,
///              RDB$FIELD_SUB_TYPE INTEGER, RDB$FIELD_LENGTH INTEGER,
///              RDB$CHARACTER_LENGTH INTEGER, RDB$FIELD_SCALE INTEGER,
///              RDB$SYSTEM_FLAG INTEGER, RDB$NULL_FLAG INTEGER);
///          INSERT INTO RDB$FIELDS VALUES ('D_ID', 8, 0, 4, NULL, 0, 0, NULL);",
///     )
///     .unwrap();
///
/// let domains = SchemaReader::new(&mut catalog, "RDB$").list_domains().unwrap();
/// assert_eq!(domains[0].name, "D_ID");
/// assert_eq!(domains[0].field_type.to_string(), "INTEGER");
/// ```
pub struct SchemaReader<'a, C: Catalog> {
    catalog: &'a mut C,
    system_prefix: String,
}

impl<'a, C: Catalog> SchemaReader<'a, C> {
    /// Creates a reader. Domains whose name starts with `system_prefix`
    /// are treated as engine-owned and skipped.
    pub fn new(catalog: &'a mut C, system_prefix: impl Into<String>) -> Self {
        Self {
            catalog,
            system_prefix: system_prefix.into(),
        }
    }

    /// Lists user domains ordered by name.
    pub fn list_domains(&mut self) -> Result<Vec<DomainDescriptor>> {
        let pattern = format!("{}%", self.system_prefix);
        let rows: Vec<DomainRow> = self.catalog.query(DOMAINS_SQL, &[pattern.as_str()])?;
        Ok(rows
            .into_iter()
            .map(|row| DomainDescriptor {
                field_type: decode_logged(&row.field, &row.name),
                name: row.name,
            })
            .collect())
    }

    /// Lists user tables (views excluded) with their columns in stored
    /// position order.
    pub fn list_tables(&mut self) -> Result<Vec<TableDescriptor>> {
        let relations: Vec<RelationRow> = self.catalog.query(RELATIONS_SQL, &[])?;
        let mut tables = Vec::with_capacity(relations.len());
        for relation in relations {
            let rows: Vec<ColumnRow> = self.catalog.query(COLUMNS_SQL, &[relation.name.as_str()])?;
            let mut table = TableDescriptor::new(relation.name);
            for row in rows {
                let owner = format!("{}.{}", table.name, row.name);
                table.columns.push(ColumnDescriptor {
                    field_type: decode_logged(&row.field, &owner),
                    nullable: row.null_flag.is_none(),
                    name: row.name,
                });
            }
            tables.push(table);
        }
        Ok(tables)
    }

    /// Lists user procedures ordered by name, parameters split into inputs
    /// and outputs.
    pub fn list_procedures(&mut self) -> Result<Vec<ProcedureDescriptor>> {
        let rows: Vec<ProcedureRow> = self.catalog.query(PROCEDURES_SQL, &[])?;
        let mut procedures = Vec::with_capacity(rows.len());
        for row in rows {
            let params: Vec<ParameterRow> = self.catalog.query(PARAMETERS_SQL, &[row.name.as_str()])?;
            let body = row.source.unwrap_or_default().trim().to_string();
            let mut procedure = ProcedureDescriptor::new(row.name, row.id, body);
            for param in params {
                let owner = format!("{}.{}", procedure.name, param.name);
                let descriptor =
                    ParameterDescriptor::new(param.name, decode_logged(&param.field, &owner));
                if param.direction == OUTPUT_PARAMETER {
                    procedure.outputs.push(descriptor);
                } else {
                    procedure.inputs.push(descriptor);
                }
            }
            procedures.push(procedure);
        }
        Ok(procedures)
    }
}

fn decode_logged(field: &RawField, owner: &str) -> FieldType {
    let field_type = field.decode();
    if field_type.is_unknown() {
        tracing::warn!(entity = owner, code = ?field.field_type, "unknown field type");
    }
    field_type
}
