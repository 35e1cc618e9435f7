use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dbmeta_catalog::{
    CatalogBackend, ConnectionString, FirebirdCatalog, SqliteCatalog, build_database,
    export_scripts, update_database,
};
use dbmeta_core::ScriptCategory;
use dbmeta_scripts::{Backend, ToolConfig};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for missing or unknown arguments.
const EXIT_USAGE: i32 = 1;
/// Exit code for failures after the arguments were accepted.
const EXIT_FAILURE: i32 = -1;

#[derive(Debug, Parser)]
#[command(name = "dbmeta", version)]
#[command(about = "Build, export and update database schemas from SQL script trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a fresh database and run every script against it.
    BuildDb(BuildDbArgs),
    /// Write the schema of an existing database as script files.
    ExportScripts(ExportScriptsArgs),
    /// Run every script against an existing database.
    UpdateDb(UpdateDbArgs),
}

#[derive(Debug, Args)]
struct BuildDbArgs {
    /// Directory that receives the database file (created if missing).
    #[arg(long)]
    db_dir: PathBuf,
    /// Script root containing Domains/, Tables/ and Procedures/.
    #[arg(long)]
    scripts_dir: PathBuf,
}

#[derive(Debug, Args)]
struct ExportScriptsArgs {
    /// Database path or `key=value;...` connection string.
    #[arg(long)]
    connection_string: String,
    /// Directory that receives Domains/, Tables/ and Procedures/.
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Debug, Args)]
struct UpdateDbArgs {
    /// Database path or `key=value;...` connection string.
    #[arg(long)]
    connection_string: String,
    /// Script root containing Domains/, Tables/ and Procedures/.
    #[arg(long)]
    scripts_dir: PathBuf,
}

/// Lower-cases the command name so `BUILD-DB` and `build-db` are the same
/// command. Flags and their values are left alone.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    if let Some(command) = args.get_mut(1) {
        if let Some(text) = command.to_str() {
            if !text.starts_with('-') {
                *command = OsString::from(text.to_lowercase());
            }
        }
    }
    args
}

fn main() {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version requests are not usage errors.
            let code = if err.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::BuildDb(args) => run_build_db(args),
        Command::ExportScripts(args) => run_export_scripts(args),
        Command::UpdateDb(args) => run_update_db(args),
    };

    if let Err(err) = result {
        println!("error: {err}");
        std::process::exit(EXIT_FAILURE);
    }
}

fn load_config() -> Result<ToolConfig, String> {
    let config =
        ToolConfig::from_env().map_err(|e| format!("Failed to load configuration: {e}"))?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

// ---------------------------------------------------------------------------
// build-db command
// ---------------------------------------------------------------------------

fn run_build_db(args: BuildDbArgs) -> Result<(), String> {
    let config = load_config()?;
    match config.backend {
        Backend::Firebird => build_db::<FirebirdCatalog>(args, &config),
        Backend::Sqlite => build_db::<SqliteCatalog>(args, &config),
    }
}

fn build_db<B: CatalogBackend>(args: BuildDbArgs, config: &ToolConfig) -> Result<(), String> {
    let report = build_database::<B>(&args.db_dir, &args.scripts_dir, config)
        .map_err(|e| format!("Build failed: {e}"))?;
    println!("Database created at '{}'.", report.database.display());
    for category in ScriptCategory::ALL {
        let counts = report.run.category(category);
        println!(
            "  {category}: {} files, {} statements",
            counts.files, counts.statements
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// export-scripts command
// ---------------------------------------------------------------------------

fn run_export_scripts(args: ExportScriptsArgs) -> Result<(), String> {
    let config = load_config()?;
    match config.backend {
        Backend::Firebird => export::<FirebirdCatalog>(args, &config),
        Backend::Sqlite => export::<SqliteCatalog>(args, &config),
    }
}

fn export<B: CatalogBackend>(
    args: ExportScriptsArgs,
    config: &ToolConfig,
) -> Result<(), String> {
    let conn = ConnectionString::parse(&args.connection_string).map_err(|e| e.to_string())?;
    let report = export_scripts::<B>(&conn, &args.output_dir, config, PACKAGE_VERSION)
        .map_err(|e| format!("Export failed: {e}"))?;
    println!("Scripts exported to '{}':", report.root.display());
    for category in ScriptCategory::ALL {
        println!("  {category}: {} files", report.count(category));
    }
    println!("Manifest: {}", report.manifest_path().display());
    Ok(())
}

// ---------------------------------------------------------------------------
// update-db command
// ---------------------------------------------------------------------------

fn run_update_db(args: UpdateDbArgs) -> Result<(), String> {
    let config = load_config()?;
    match config.backend {
        Backend::Firebird => update_db::<FirebirdCatalog>(args, &config),
        Backend::Sqlite => update_db::<SqliteCatalog>(args, &config),
    }
}

fn update_db<B: CatalogBackend>(args: UpdateDbArgs, config: &ToolConfig) -> Result<(), String> {
    let conn = ConnectionString::parse(&args.connection_string).map_err(|e| e.to_string())?;
    let report = update_database::<B>(&conn, &args.scripts_dir, config)
        .map_err(|e| format!("Update failed: {e}"))?;
    println!(
        "Database '{conn}' updated: {} files, {} statements.",
        report.files(),
        report.statements()
    );
    Ok(())
}
