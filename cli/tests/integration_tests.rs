use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn dbmeta(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dbmeta"))
        .args(args)
        .env_remove("DBMETA_CONFIG")
        .output()
        .expect("failed to run dbmeta")
}

/// Runs dbmeta against local SQLite files, with the config written to `dir`.
fn dbmeta_sqlite(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("dbmeta-test.yaml");
    fs::write(&config, "backend: sqlite\n").unwrap();
    Command::new(env!("CARGO_BIN_EXE_dbmeta"))
        .args(args)
        .env("DBMETA_CONFIG", &config)
        .output()
        .expect("failed to run dbmeta")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn write_script(root: &Path, category: &str, name: &str, text: &str) {
    let dir = root.join(category);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), text).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

#[test]
fn no_arguments_is_a_usage_error() {
    let output = dbmeta(&[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_command_is_a_usage_error() {
    let output = dbmeta(&["drop-db", "--db-dir", "x"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_flag_is_a_usage_error() {
    let output = dbmeta(&["build-db", "--db-dir", "x"]);
    assert_eq!(output.status.code(), Some(1));

    let output = dbmeta(&["update-db", "--connection-string"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn command_names_are_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    write_script(&scripts, "Tables", "01_t.sql", "CREATE TABLE T (ID INTEGER);\n");

    let output = dbmeta_sqlite(dir.path(), &[
        "BUILD-DB",
        "--db-dir",
        path_arg(dir.path()),
        "--scripts-dir",
        path_arg(&scripts),
    ]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(dir.path().join("fb_database.fdb").is_file());

    let output = dbmeta(&["Update-Db", "--connection-string"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn help_exits_cleanly() {
    let output = dbmeta(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("build-db"));
    assert!(text.contains("export-scripts"));
    assert!(text.contains("update-db"));
}

// ---------------------------------------------------------------------------
// build-db
// ---------------------------------------------------------------------------

#[test]
fn build_db_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    write_script(&scripts, "Tables", "01_t.sql", "CREATE TABLE T (ID INTEGER NOT NULL);\n");
    let db_dir = dir.path().join("db");

    let output = dbmeta_sqlite(dir.path(), &[
        "build-db",
        "--db-dir",
        path_arg(&db_dir),
        "--scripts-dir",
        path_arg(&scripts),
    ]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(db_dir.join("fb_database.fdb").is_file());
    assert!(stdout(&output).contains("Tables: 1 files, 1 statements"));
}

#[test]
fn build_db_reports_failing_script_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    write_script(&scripts, "Tables", "01_bad.sql", "CREATE TABLE T (ID INTEGER);\nNOT SQL;\n");

    let output = dbmeta_sqlite(dir.path(), &[
        "build-db",
        "--db-dir",
        path_arg(dir.path()),
        "--scripts-dir",
        path_arg(&scripts),
    ]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.starts_with("error: "), "{text}");
    assert!(text.contains("01_bad.sql"), "{text}");
}

#[test]
fn build_db_honors_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    write_script(&scripts, "Domains", "d.sql", "CREATE TABLE D (ID INTEGER);");
    let config = dir.path().join("dbmeta.yaml");
    fs::write(&config, "backend: sqlite\ndatabase_file: custom.db\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_dbmeta"))
        .args([
            "build-db",
            "--db-dir",
            path_arg(dir.path()),
            "--scripts-dir",
            path_arg(&scripts),
        ])
        .env("DBMETA_CONFIG", &config)
        .output()
        .expect("failed to run dbmeta");
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(dir.path().join("custom.db").is_file());
    assert!(!dir.path().join("fb_database.fdb").exists());
}

// ---------------------------------------------------------------------------
// update-db
// ---------------------------------------------------------------------------

#[test]
fn update_db_missing_scripts_dir_fails_at_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("fb_database.fdb");

    let output = dbmeta(&[
        "update-db",
        "--connection-string",
        path_arg(&db),
        "--scripts-dir",
        path_arg(&dir.path().join("missing")),
    ]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("directory not found"));
    assert!(!db.exists());
}

#[test]
fn update_db_applies_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base");
    write_script(&base, "Tables", "t.sql", "CREATE TABLE T (ID INTEGER);");
    let status = dbmeta_sqlite(dir.path(), &[
        "build-db",
        "--db-dir",
        path_arg(dir.path()),
        "--scripts-dir",
        path_arg(&base),
    ])
    .status;
    assert!(status.success());

    let patch = dir.path().join("patch");
    write_script(&patch, "Tables", "u.sql", "CREATE TABLE U (ID INTEGER);");
    let db = dir.path().join("fb_database.fdb");
    let conn = format!("Database={};User=SYSDBA;Password=masterkey", db.display());
    let output = dbmeta_sqlite(dir.path(), &[
        "update-db",
        "--connection-string",
        &conn,
        "--scripts-dir",
        path_arg(&patch),
    ]);
    assert!(output.status.success(), "{}", stdout(&output));

    let check = rusqlite::Connection::open(&db).unwrap();
    let count: i64 = check
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('T', 'U')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);
}

// ---------------------------------------------------------------------------
// export-scripts
// ---------------------------------------------------------------------------

#[test]
fn export_scripts_writes_category_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("source.fdb");
    {
        let conn = rusqlite::Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE RDB$FIELDS (RDB$FIELD_NAME CHAR(63), RDB$FIELD_TYPE INTEGER,
                 RDB$FIELD_SUB_TYPE INTEGER, RDB$FIELD_LENGTH INTEGER,
                 RDB$CHARACTER_LENGTH INTEGER, RDB$FIELD_SCALE INTEGER,
                 RDB$SYSTEM_FLAG INTEGER, RDB$NULL_FLAG INTEGER);
             CREATE TABLE RDB$RELATIONS (RDB$RELATION_NAME CHAR(63), RDB$SYSTEM_FLAG INTEGER,
                 RDB$VIEW_BLR BLOB);
             CREATE TABLE RDB$RELATION_FIELDS (RDB$RELATION_NAME CHAR(63), RDB$FIELD_NAME CHAR(63),
                 RDB$FIELD_SOURCE CHAR(63), RDB$FIELD_POSITION INTEGER, RDB$NULL_FLAG INTEGER);
             CREATE TABLE RDB$PROCEDURES (RDB$PROCEDURE_NAME CHAR(63), RDB$PROCEDURE_ID INTEGER,
                 RDB$PROCEDURE_SOURCE TEXT, RDB$SYSTEM_FLAG INTEGER);
             CREATE TABLE RDB$PROCEDURE_PARAMETERS (RDB$PARAMETER_NAME CHAR(63),
                 RDB$PROCEDURE_NAME CHAR(63), RDB$PARAMETER_NUMBER INTEGER,
                 RDB$PARAMETER_TYPE INTEGER, RDB$FIELD_SOURCE CHAR(63));
             INSERT INTO RDB$FIELDS VALUES ('D_CODE', 14, 0, 3, 3, 0, 0, NULL);
             INSERT INTO RDB$FIELDS VALUES ('RDB$1', 8, NULL, 4, NULL, 0, 0, NULL);
             INSERT INTO RDB$RELATIONS VALUES ('T', 0, NULL);
             INSERT INTO RDB$RELATION_FIELDS VALUES ('T', 'ID', 'RDB$1', 0, 1);
             INSERT INTO RDB$PROCEDURES VALUES ('P', 4, 'BEGIN SUSPEND; END', 0);",
        )
        .unwrap();
    }
    let out = dir.path().join("out");

    let output = dbmeta_sqlite(dir.path(), &[
        "export-scripts",
        "--connection-string",
        path_arg(&db),
        "--output-dir",
        path_arg(&out),
    ]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert_eq!(
        fs::read_to_string(out.join("Domains/D_CODE.sql")).unwrap(),
        "CREATE DOMAIN D_CODE AS CHAR(3);\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("Tables/T.sql")).unwrap(),
        "CREATE TABLE T (\n  ID INTEGER NOT NULL\n);\n"
    );
    assert!(out.join("Procedures/4_P.sql").is_file());
    assert!(out.join("export-manifest.json").is_file());
}

#[test]
fn export_scripts_uses_firebird_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let conn = format!("Database={};Port=fb", dir.path().join("app.fdb").display());
    let output = dbmeta(&[
        "export-scripts",
        "--connection-string",
        &conn,
        "--output-dir",
        path_arg(&dir.path().join("out")),
    ]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("invalid port 'fb'"), "{text}");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn export_scripts_missing_database_fails_at_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let output = dbmeta_sqlite(dir.path(), &[
        "export-scripts",
        "--connection-string",
        path_arg(&dir.path().join("missing.fdb")),
        "--output-dir",
        path_arg(&dir.path().join("out")),
    ]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("error: "));
}
