//! Logbook emitters.
//!
//! Two targets: one CSV file per equipment block, or a single JSON
//! workbook document. Both carry the explicit locked-cell state the
//! presentation layer keys off; neither re-derives it from emptiness.

mod csv;
mod json;

pub use csv::{render_sheet, sheet_file_name, write_sheets, LOCKED_MARKER};
pub use json::{render_workbook, write_workbook, WorkbookMeta};

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for generated logbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One CSV file per equipment block
    #[default]
    Csv,

    /// A single JSON workbook document
    Json,
}

impl OutputFormat {
    /// Get the canonical label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
