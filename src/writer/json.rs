//! JSON workbook emission.
//!
//! The whole logbook goes into one document so downstream tooling can
//! pick it up in a single read. Cell states serialize as
//! `"editable"`/`"locked"` strings.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::core::{Logbook, LogbookRow};

/// Metadata stamped onto a workbook document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookMeta {
    /// Production reference the logbook belongs to, when known
    pub production_ref: Option<String>,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
}

impl WorkbookMeta {
    /// Create metadata stamped with the current time.
    pub fn new(production_ref: Option<String>) -> Self {
        Self { production_ref, generated_at: Utc::now() }
    }
}

#[derive(Serialize)]
struct WorkbookDoc<'a> {
    production_ref: Option<&'a str>,
    generated_at: String,
    run_columns: usize,
    sheets: Vec<SheetDoc<'a>>,
}

#[derive(Serialize)]
struct SheetDoc<'a> {
    block: &'a str,
    rows: &'a [LogbookRow],
}

/// Render the workbook as a pretty-printed JSON document.
pub fn render_workbook(logbook: &Logbook, meta: &WorkbookMeta) -> Result<String> {
    let doc = WorkbookDoc {
        production_ref: meta.production_ref.as_deref(),
        generated_at: meta.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        run_columns: logbook.run_columns(),
        sheets: logbook.sheets().map(|(block, rows)| SheetDoc { block, rows }).collect(),
    };

    serde_json::to_string_pretty(&doc).context("failed to serialize workbook")
}

/// Write the workbook document to `path`, creating parent directories
/// as needed.
pub fn write_workbook(logbook: &Logbook, meta: &WorkbookMeta, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }

    let content = render_workbook(logbook, meta)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write workbook {}", path.display()))?;
    tracing::debug!(path = %path.display(), sheets = logbook.sheet_count(), "Wrote workbook");

    Ok(())
}
