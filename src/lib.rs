//! # Prodbook
//!
//! Production logbook generator - turn a procedure catalog and a
//! production initialization file into per-equipment logbook sheets.
//!
//! The pipeline has three layers:
//!
//! - **reader**: resolves catalog files (CSV, JSON, YAML) and
//!   initialization files into typed records, and recovers the
//!   production reference (`ST` + two digits) from the init file name.
//! - **core**: builds the catalog index, validates every init entry
//!   against it, expands (stack, production field) pairs into rows,
//!   routes rows per equipment block, and merges rows that differ only
//!   by stack.
//! - **writer**: emits one CSV sheet per block, or a single JSON
//!   workbook document, with locked cells marked explicitly.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install prodbook
//!
//! # Generate logbook sheets
//! prodbook build --catalog catalog.csv --init lancement_ST42.csv --out out/
//!
//! # Check an init file against the catalog without writing anything
//! prodbook validate --catalog catalog.csv --init lancement_ST42.csv
//! ```

pub mod core;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use self::core::{
    merge_rows, synthesize, validate_entries, CatalogError, CatalogIndex, Config, FieldRecord,
    InitEntry, Logbook, LogbookRow, ProcedureKey, SynthesisError,
};
pub use self::reader::{load_catalog, load_init, InitFile};
pub use self::writer::{write_sheets, write_workbook, OutputFormat, WorkbookMeta};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "prodbook";
