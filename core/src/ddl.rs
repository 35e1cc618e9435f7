//! Rendering of schema descriptors back into DDL scripts.
//!
//! Every rendered script is valid input for [`split_script`](crate::split_script):
//! domains and tables end with the default `;` terminator, procedures are
//! wrapped in `SET TERM ^ ;` / `SET TERM ; ^` directives so the body may
//! contain semicolons.

use crate::{DomainDescriptor, ParameterDescriptor, ProcedureDescriptor, ScriptCategory, TableDescriptor};

/// Terminator used inside generated procedure scripts.
pub const PROCEDURE_TERMINATOR: &str = "^";

/// Renders `CREATE DOMAIN <name> AS <type>;`.
///
/// # Examples
///
/// ```
/// use dbmeta_core::{render_domain, DomainDescriptor, FieldType};
///
/// let domain = DomainDescriptor { name: "D_MONEY".into(), field_type: FieldType::Numeric { precision: 18, scale: 2 } };
/// assert_eq!(render_domain(&domain), "CREATE DOMAIN D_MONEY AS NUMERIC(18, 2);");
/// ```
pub fn render_domain(domain: &DomainDescriptor) -> String {
    format!("CREATE DOMAIN {} AS {};", domain.name, domain.field_type)
}

/// Renders a `CREATE TABLE` statement with one column per line.
///
/// Columns keep their positional order; `NOT NULL` is appended only to
/// non-nullable columns.
///
/// # Examples
///
/// ```
/// use dbmeta_core::{render_table, ColumnDescriptor, FieldType, TableDescriptor};
///
/// let table = TableDescriptor::new("T")
///     .with_column(ColumnDescriptor::new("ID", FieldType::Integer).not_null())
///     .with_column(ColumnDescriptor::new("NAME", FieldType::Varchar(50)));
/// assert_eq!(
///     render_table(&table),
///     "CREATE TABLE T (\n  ID INTEGER NOT NULL,\n  NAME VARCHAR(50)\n);"
/// );
/// ```
pub fn render_table(table: &TableDescriptor) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let mut line = format!("  {} {}", column.name, column.field_type);
            if !column.nullable {
                line.push_str(" NOT NULL");
            }
            line
        })
        .collect();
    format!("CREATE TABLE {} (\n{}\n);", table.name, columns.join(",\n"))
}

fn parameter_list(params: &[ParameterDescriptor]) -> String {
    let defs: Vec<String> = params
        .iter()
        .map(|param| format!("{} {}", param.name, param.field_type))
        .collect();
    format!("({})", defs.join(",\n "))
}

/// Renders the `CREATE OR ALTER PROCEDURE` statement without terminator
/// directives.
///
/// This is exactly the statement [`split_script`](crate::split_script)
/// yields for the output of [`render_procedure`].
pub fn procedure_statement(procedure: &ProcedureDescriptor) -> String {
    let mut out = format!("CREATE OR ALTER PROCEDURE {}", procedure.name);
    if !procedure.inputs.is_empty() {
        out.push('\n');
        out.push_str(&parameter_list(&procedure.inputs));
    }
    if !procedure.outputs.is_empty() {
        out.push_str("\nRETURNS\n");
        out.push_str(&parameter_list(&procedure.outputs));
    }
    out.push_str("\nAS");
    let body = procedure.body.trim();
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    out
}

/// Renders a self-contained procedure script.
///
/// The script switches the terminator to `^`, emits the procedure
/// statement closed by `^`, then restores `;`.
///
/// # Examples
///
/// ```
/// use dbmeta_core::{procedure_statement, render_procedure, split_script, FieldType, ParameterDescriptor, ProcedureDescriptor};
///
/// let proc = ProcedureDescriptor::new("GET_ONE", 3, "BEGIN\n  X = 1;\n  SUSPEND;\nEND")
///     .with_output(ParameterDescriptor::new("X", FieldType::Integer));
/// let script = render_procedure(&proc);
/// assert!(script.starts_with("SET TERM ^ ;"));
/// assert_eq!(split_script(&script).into_vec(), vec![procedure_statement(&proc)]);
/// ```
pub fn render_procedure(procedure: &ProcedureDescriptor) -> String {
    format!(
        "SET TERM {term} ;\n\n{statement}{term}\n\nSET TERM ; {term}",
        term = PROCEDURE_TERMINATOR,
        statement = procedure_statement(procedure),
    )
}

/// Returns the file stem used when exporting an entity.
///
/// Domains and tables are named after the entity; procedures are prefixed
/// with their dictionary identifier (`<id>_<name>`). Characters that are
/// not portable in file names are replaced by `_`.
///
/// # Examples
///
/// ```
/// use dbmeta_core::{script_file_stem, ScriptCategory};
///
/// assert_eq!(script_file_stem(ScriptCategory::Table, "CUSTOMERS", None), "CUSTOMERS");
/// assert_eq!(script_file_stem(ScriptCategory::Procedure, "GET_ONE", Some(7)), "7_GET_ONE");
/// assert_eq!(script_file_stem(ScriptCategory::Domain, "A/B", None), "A_B");
/// ```
pub fn script_file_stem(category: ScriptCategory, name: &str, id: Option<i64>) -> String {
    let safe = sanitize_file_name(name);
    match (category, id) {
        (ScriptCategory::Procedure, Some(id)) => format!("{id}_{safe}"),
        _ => safe,
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}
