use std::path::Path;

use dbmeta_core::{
    ColumnDescriptor, DomainDescriptor, FieldType, ParameterDescriptor, ProcedureDescriptor,
    ScriptCategory, TableDescriptor, procedure_statement, render_domain, render_procedure,
    render_table, script_file_stem,
};
use dbmeta_scripts::{ExportManifest, ExportWriter, MANIFEST_FILE, ScriptSet, ToolConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_script(root: &Path, category: ScriptCategory, name: &str, text: &str) {
    let dir = root.join(category.dir_name());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), text).unwrap();
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn test_files_created_out_of_order_load_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), ScriptCategory::Table, "02_y.sql", "CREATE TABLE Y (ID INTEGER);");
    write_script(dir.path(), ScriptCategory::Table, "01_x.sql", "CREATE TABLE X (ID INTEGER);");
    write_script(dir.path(), ScriptCategory::Domain, "b.sql", "CREATE DOMAIN B AS INTEGER;");
    write_script(dir.path(), ScriptCategory::Domain, "a.sql", "CREATE DOMAIN A AS INTEGER;");

    let set = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap();
    let names: Vec<_> = set.scripts().iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.sql", "b.sql", "01_x.sql", "02_y.sql"]);
}

#[test]
fn test_sort_is_plain_lexicographic() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.sql", "C.sql", "10.sql", "9.sql", "_x.sql"] {
        write_script(dir.path(), ScriptCategory::Procedure, name, "SELECT 1;");
    }

    let set = ScriptSet::from_dir(dir.path(), &ToolConfig::default()).unwrap();
    let names: Vec<_> = set.scripts().iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec!["10.sql", "9.sql", "C.sql", "_x.sql", "b.sql"]);
}

#[test]
fn test_custom_extension_from_config() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), ScriptCategory::Table, "t.ddl", "CREATE TABLE T (ID INTEGER);");
    write_script(dir.path(), ScriptCategory::Table, "u.sql", "CREATE TABLE U (ID INTEGER);");

    let config = ToolConfig {
        script_extension: "ddl".into(),
        ..ToolConfig::default()
    };
    let set = ScriptSet::from_dir(dir.path(), &config).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.scripts()[0].file_name, "t.ddl");
}

// ---------------------------------------------------------------------------
// Export → load round trip
// ---------------------------------------------------------------------------

#[test]
fn test_export_tree_round_trips_into_statements() {
    let dir = tempfile::tempdir().unwrap();
    let config = ToolConfig::default();

    let domain = DomainDescriptor {
        name: "D_MONEY".into(),
        field_type: FieldType::Numeric { precision: 18, scale: 2 },
    };
    let table = TableDescriptor::new("ORDERS")
        .with_column(ColumnDescriptor::new("ID", FieldType::BigInt).not_null())
        .with_column(ColumnDescriptor::new("TOTAL", FieldType::Numeric { precision: 18, scale: 2 }));
    let procedure = ProcedureDescriptor::new("ORDER_TOTAL", 5, "BEGIN\n  SELECT TOTAL FROM ORDERS WHERE ID = :ID INTO :TOTAL;\n  SUSPEND;\nEND")
        .with_input(ParameterDescriptor::new("ID", FieldType::BigInt))
        .with_output(ParameterDescriptor::new("TOTAL", FieldType::Numeric { precision: 18, scale: 2 }));

    let mut writer = ExportWriter::create(dir.path(), &config, "test").unwrap();
    writer
        .write(
            ScriptCategory::Domain,
            &domain.name,
            &script_file_stem(ScriptCategory::Domain, &domain.name, None),
            &render_domain(&domain),
        )
        .unwrap();
    writer
        .write(
            ScriptCategory::Table,
            &table.name,
            &script_file_stem(ScriptCategory::Table, &table.name, None),
            &render_table(&table),
        )
        .unwrap();
    writer
        .write(
            ScriptCategory::Procedure,
            &procedure.name,
            &script_file_stem(ScriptCategory::Procedure, &procedure.name, Some(procedure.id)),
            &render_procedure(&procedure),
        )
        .unwrap();
    let manifest = writer.finish().unwrap();

    let set = ScriptSet::from_dir(dir.path(), &config).unwrap();
    let statements: Vec<Vec<String>> = set
        .scripts()
        .iter()
        .map(|s| s.statements().into_vec())
        .collect();
    assert_eq!(
        statements,
        vec![
            vec!["CREATE DOMAIN D_MONEY AS NUMERIC(18, 2)".to_string()],
            vec!["CREATE TABLE ORDERS (\n  ID BIGINT NOT NULL,\n  TOTAL NUMERIC(18, 2)\n)".to_string()],
            vec![procedure_statement(&procedure)],
        ]
    );
    assert_eq!(set.scripts()[2].file_name, "5_ORDER_TOTAL.sql");

    let reloaded = ExportManifest::load(dir.path().join(MANIFEST_FILE)).unwrap();
    assert_eq!(reloaded.entries, manifest.entries);
    assert!(reloaded.modified_entries(dir.path()).is_empty());
}
