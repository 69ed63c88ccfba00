//! Prodbook - production logbook generator.
//!
//! Prodbook turns a procedure catalog and a production initialization
//! file into per-equipment logbook sheets ready for run-time data
//! entry.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prodbook::core::{
    synthesize, validate_entries, CatalogIndex, Config, FieldRecord, ProcedureKey,
};
use prodbook::reader::{load_catalog, load_init};
use prodbook::writer::{write_sheets, write_workbook, OutputFormat, WorkbookMeta};

/// Production logbook generator
#[derive(Parser)]
#[command(name = "prodbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate logbook sheets from a catalog and an init file
    Build {
        /// Procedure catalog file (csv, json, or yaml)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Production initialization file (csv, json, or yaml)
        #[arg(short, long)]
        init: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Number of run columns per row
        #[arg(long)]
        run_columns: Option<usize>,

        /// Production reference, overriding the init file name
        #[arg(long)]
        production_ref: Option<String>,
    },

    /// Check a catalog, and optionally an init file, without writing anything
    Validate {
        /// Procedure catalog file
        #[arg(short, long)]
        catalog: PathBuf,

        /// Production initialization file
        #[arg(short, long)]
        init: Option<PathBuf>,
    },

    /// Inspect the procedures of a catalog
    #[command(disable_version_flag = true)]
    Catalog {
        /// Procedure catalog file
        #[arg(short, long)]
        file: PathBuf,

        /// Show one procedure's fields instead of the overview
        #[arg(short, long, requires = "version")]
        procedure: Option<String>,

        /// Version of the procedure to show
        #[arg(long, requires = "procedure")]
        version: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    match cli.command {
        Commands::Build { catalog, init, out, format, run_columns, production_ref } => {
            cmd_build(&catalog, &init, out, format, run_columns, production_ref)?;
        }
        Commands::Validate { catalog, init } => {
            cmd_validate(&catalog, init.as_deref())?;
        }
        Commands::Catalog { file, procedure, version, format } => {
            cmd_catalog(&file, procedure.as_deref(), version.as_deref(), &format)?;
        }
        Commands::Config { path } => {
            cmd_config(path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Run the full pipeline: load both files, synthesize, write sheets.
fn cmd_build(
    catalog_path: &Path,
    init_path: &Path,
    out: Option<PathBuf>,
    format: Option<OutputFormat>,
    run_columns: Option<usize>,
    production_ref: Option<String>,
) -> Result<()> {
    let config = Config::load()?;
    let out = out.unwrap_or(config.output.dir);
    let format = format.unwrap_or(config.output.format);
    let run_columns = run_columns.unwrap_or(config.logbook.run_columns);

    let index = CatalogIndex::build(load_catalog(catalog_path)?)?;
    let init = load_init(init_path)?;

    let production_ref = production_ref.or(init.production_ref);
    if production_ref.is_none() {
        eprintln!(
            "Warning: no production reference (ST + two digits) in the init file name; \
             pass --production-ref to name the output"
        );
    }

    let logbook = match synthesize(&index, &init.entries, run_columns) {
        Ok(logbook) => logbook,
        Err(err) => {
            for message in err.messages() {
                eprintln!("  {message}");
            }
            return Err(err.into());
        }
    };

    if logbook.is_empty() {
        println!("No production fields to record; nothing written.");
        return Ok(());
    }

    match format {
        OutputFormat::Csv => {
            let dir = match &production_ref {
                Some(re) => out.join(format!("logbook_{re}")),
                None => out.join("logbook"),
            };
            let written = write_sheets(&logbook, &dir)?;

            println!("Wrote {} sheet(s) to {}:", written.len(), dir.display());
            for path in &written {
                println!("  {}", path.display());
            }
        }
        OutputFormat::Json => {
            let path = match &production_ref {
                Some(re) => out.join(format!("logbook_{re}.json")),
                None => out.join("logbook.json"),
            };
            let meta = WorkbookMeta::new(production_ref);
            write_workbook(&logbook, &meta, &path)?;

            println!("Wrote {} sheet(s) to {}", logbook.sheet_count(), path.display());
        }
    }

    Ok(())
}

/// Check catalog integrity and, when given, an init file's references.
fn cmd_validate(catalog_path: &Path, init_path: Option<&Path>) -> Result<()> {
    let index = CatalogIndex::build(load_catalog(catalog_path)?)?;
    println!("Catalog OK: {} procedure(s) across {} block(s)", index.len(), index.blocks().len());

    if let Some(init_path) = init_path {
        let init = load_init(init_path)?;
        let failures = validate_entries(&index, &init.entries);

        if !failures.is_empty() {
            for failure in &failures {
                eprintln!("  {failure}");
            }
            bail!("initialization file references {} unknown procedure(s)", failures.len());
        }

        println!("Init OK: {} entries reference known procedures", init.entries.len());
    }

    Ok(())
}

/// Procedure overview line for `catalog --format json`.
#[derive(Serialize)]
struct ProcedureSummary<'a> {
    procedure_name: &'a str,
    procedure_version: &'a str,
    block: &'a str,
    fields: usize,
    production_fields: usize,
}

/// Inspect a catalog: the procedure overview, or one procedure's fields.
fn cmd_catalog(
    path: &Path,
    procedure: Option<&str>,
    version: Option<&str>,
    format: &str,
) -> Result<()> {
    let index = CatalogIndex::build(load_catalog(path)?)?;

    if let (Some(name), Some(version)) = (procedure, version) {
        let key = ProcedureKey::new(name, version);
        let entry =
            index.get(&key).ok_or_else(|| anyhow!("procedure {key} not found in catalog"))?;

        match format {
            "json" => {
                let json = serde_json::to_string_pretty(entry)?;
                println!("{json}");
            }
            _ => {
                println!("{key} (block {})", entry.block);
                for field in &entry.fields {
                    print_field(field);
                }
                println!(
                    "\n{} field(s), {} recorded in production",
                    entry.fields.len(),
                    entry.production_field_count()
                );
            }
        }

        return Ok(());
    }

    match format {
        "json" => {
            let summaries: Vec<ProcedureSummary<'_>> = index
                .iter()
                .map(|(key, entry)| ProcedureSummary {
                    procedure_name: &key.name,
                    procedure_version: &key.version,
                    block: &entry.block,
                    fields: entry.fields.len(),
                    production_fields: entry.production_field_count(),
                })
                .collect();
            let json = serde_json::to_string_pretty(&summaries)?;
            println!("{json}");
        }
        _ => {
            for (key, entry) in index.iter() {
                println!(
                    "{} (block {}) - {} field(s), {} production",
                    key,
                    entry.block,
                    entry.fields.len(),
                    entry.production_field_count()
                );
            }
            println!("\nTotal: {} procedures", index.len());
        }
    }

    Ok(())
}

/// Print one catalog field as an indented detail line.
fn print_field(field: &FieldRecord) {
    let mut line = format!("  {} ({}, {})", field.name, field.kind, field.perimeter);
    if !field.unit.is_empty() {
        line.push_str(&format!(" [{}]", field.unit));
    }
    if !field.description.is_empty() {
        line.push_str(&format!(" - {}", field.description));
    }
    println!("{line}");

    if let Some(recipe) = &field.recipe_value {
        println!("      recipe: {recipe}");
    }
    if let (Some(min), Some(max)) = (field.min_value, field.max_value) {
        println!("      limits: {min} to {max}");
    }
    if let Some(origin) = &field.origin {
        println!("      origin: {origin}");
    }
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    print!("{}", config.to_toml()?);

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "prodbook", &mut io::stdout());
}
