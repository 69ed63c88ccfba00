//! Core types and functionality for prodbook.
//!
//! This module contains the fundamental data structures used throughout
//! the application: catalog fields, the catalog index, init entries,
//! logbook synthesis, and configuration.

mod config;
mod entry;
mod field;
mod index;
mod logbook;
mod row;

pub use config::{Config, LogbookConfig, OutputConfig, PROJECT_CONFIG_FILE};
pub use entry::InitEntry;
pub use field::{DataKind, FieldRecord, Perimeter, ProcedureKey};
pub use index::{CatalogError, CatalogIndex, ProcedureEntry};
pub use logbook::{
    merge_rows, synthesize, validate_entries, Logbook, SynthesisError, ValidationFailure,
};
pub use row::{column_headers, Cell, LogbookRow, DEFAULT_RUN_COLUMNS, FIXED_HEADERS};
