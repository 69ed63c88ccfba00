//! Logbook synthesis.
//!
//! Turns a catalog index plus the production initialization entries
//! into one sheet of merged rows per equipment block. Validation is
//! all-or-nothing: a single unknown procedure reference aborts the
//! whole synthesis with no partial output.

use indexmap::IndexMap;
use thiserror::Error;

use crate::core::entry::InitEntry;
use crate::core::index::CatalogIndex;
use crate::core::row::{LogbookRow, RowShape};

/// One init entry whose procedure reference is missing from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "stack {stack_ref}: procedure {procedure_name} v{procedure_version} not found in catalog"
)]
pub struct ValidationFailure {
    /// Stack carrying the dangling reference
    pub stack_ref: String,

    /// Referenced procedure name
    pub procedure_name: String,

    /// Referenced procedure version
    pub procedure_version: String,
}

/// Why a synthesis call produced no logbook.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    /// At least one init entry references a procedure the catalog does
    /// not know. Carries one failure per offending entry.
    #[error("initialization file references {} unknown procedure(s)", .0.len())]
    UnknownProcedures(Vec<ValidationFailure>),
}

impl SynthesisError {
    /// Individual failure messages, one per offending init entry.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::UnknownProcedures(failures) => {
                failures.iter().map(ToString::to_string).collect()
            }
        }
    }
}

/// The synthesized workbook: merged rows grouped per equipment block.
///
/// Blocks appear in the order they first received a row, and rows
/// within a block follow the first occurrence of each distinct shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Logbook {
    run_columns: usize,
    sheets: IndexMap<String, Vec<LogbookRow>>,
}

impl Logbook {
    /// Number of run columns each row carries.
    pub fn run_columns(&self) -> usize {
        self.run_columns
    }

    /// Iterate over (block, rows) pairs in sheet order.
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &[LogbookRow])> {
        self.sheets.iter().map(|(block, rows)| (block.as_str(), rows.as_slice()))
    }

    /// Rows of one block's sheet.
    pub fn sheet(&self, block: &str) -> Option<&[LogbookRow]> {
        self.sheets.get(block).map(Vec::as_slice)
    }

    /// Block names in sheet order.
    pub fn block_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check whether synthesis produced no rows at all.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Total merged row count across all sheets.
    pub fn total_rows(&self) -> usize {
        self.sheets.values().map(Vec::len).sum()
    }
}

/// Check every init entry against the catalog.
///
/// Returns one failure per entry whose (name, version) the catalog
/// does not contain, in entry order. Duplicate dangling references
/// stay duplicated: the report mirrors the initialization file line
/// by line.
pub fn validate_entries(index: &CatalogIndex, entries: &[InitEntry]) -> Vec<ValidationFailure> {
    entries
        .iter()
        .filter(|entry| !index.contains(&entry.key()))
        .map(|entry| ValidationFailure {
            stack_ref: entry.stack_ref.clone(),
            procedure_name: entry.procedure_name.clone(),
            procedure_version: entry.procedure_version.clone(),
        })
        .collect()
}

/// Synthesize the logbook for one initialization file.
///
/// Runs the validation gate, expands every (stack, production field)
/// pair into a row, routes rows to their procedure's block, and merges
/// rows that differ only by stack.
pub fn synthesize(
    index: &CatalogIndex,
    entries: &[InitEntry],
    run_columns: usize,
) -> Result<Logbook, SynthesisError> {
    let failures = validate_entries(index, entries);
    if !failures.is_empty() {
        return Err(SynthesisError::UnknownProcedures(failures));
    }

    let expanded = expand(index, entries, run_columns);

    let mut sheets = IndexMap::new();
    for (block, rows) in expanded {
        sheets.insert(block, merge_rows(rows));
    }

    Ok(Logbook { run_columns, sheets })
}

/// Expand init entries into per-block row lists, in entry order.
fn expand(
    index: &CatalogIndex,
    entries: &[InitEntry],
    run_columns: usize,
) -> IndexMap<String, Vec<LogbookRow>> {
    let mut blocks: IndexMap<String, Vec<LogbookRow>> = IndexMap::new();

    for entry in entries {
        // Entries passed the validation gate, so the lookup holds.
        let Some(procedure) = index.get(&entry.key()) else {
            continue;
        };

        for field in procedure.production_fields() {
            let row = LogbookRow::from_field(&entry.stack_ref, field, run_columns);
            blocks.entry(procedure.block.clone()).or_default().push(row);
        }
    }

    blocks
}

/// Merge rows sharing every column except `stack_ref`.
///
/// The merged row's `stack_ref` is the comma-joined concatenation of
/// the contributing stacks in input order, duplicates included. Output
/// keeps the first-occurrence order of each distinct shape, so merging
/// already-merged rows changes nothing.
pub fn merge_rows(rows: Vec<LogbookRow>) -> Vec<LogbookRow> {
    let mut merged: IndexMap<RowShape, LogbookRow> = IndexMap::new();

    for row in rows {
        match merged.entry(row.shape()) {
            indexmap::map::Entry::Occupied(mut slot) => {
                let joined = slot.get_mut();
                joined.stack_ref.push_str(", ");
                joined.stack_ref.push_str(&row.stack_ref);
            }
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }

    merged.into_values().collect()
}
