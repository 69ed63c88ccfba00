//! Logbook rows and cell states.
//!
//! A row is the expansion of one production field for one stack. Cell
//! state is carried explicitly rather than inferred from emptiness, so
//! a blank editable cell and a locked cell can never be confused.

use serde::{Deserialize, Serialize};

use crate::core::field::{FieldRecord, Perimeter};

/// Number of run columns emitted when no override is configured.
pub const DEFAULT_RUN_COLUMNS: usize = 20;

/// The columns every sheet starts with, ahead of the run columns.
pub const FIXED_HEADERS: [&str; 7] = [
    "stack_ref",
    "procedure_name",
    "procedure_version",
    "data_name",
    "data_description",
    "data_unit",
    "batch_data_flag",
];

/// State of one logbook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    /// Open for operator entry.
    Editable,

    /// Not applicable for this field's scope; greyed out downstream.
    Locked,
}

impl Cell {
    /// Check whether the cell is locked.
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// One output row of a logbook sheet.
///
/// Column order is fixed: `stack_ref`, `procedure_name`,
/// `procedure_version`, `data_name`, `data_description`, `data_unit`,
/// `batch_data_flag`, then `run_1..run_N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookRow {
    /// Contributing stack, or a comma-joined list after merging
    pub stack_ref: String,

    /// Procedure the field belongs to
    pub procedure_name: String,

    /// Version of that procedure
    pub procedure_version: String,

    /// Field name
    pub data_name: String,

    /// Field description
    pub data_description: String,

    /// Measurement unit
    pub data_unit: String,

    /// Batch-value column state
    pub batch_data_flag: Cell,

    /// Run column states, `runs[0]` being `run_1`
    pub runs: Vec<Cell>,
}

impl LogbookRow {
    /// Expand one production field for one stack.
    ///
    /// Run-scoped fields collect a value per run, so the batch column
    /// is locked and every run column stays editable. Batch-scoped
    /// fields collect a single value per batch, so the batch column
    /// stays editable and every run column is locked.
    pub fn from_field(stack_ref: &str, field: &FieldRecord, run_columns: usize) -> Self {
        let (batch_data_flag, run_state) = match field.perimeter {
            Perimeter::Run => (Cell::Locked, Cell::Editable),
            Perimeter::Batch => (Cell::Editable, Cell::Locked),
        };

        Self {
            stack_ref: stack_ref.to_string(),
            procedure_name: field.procedure_name.clone(),
            procedure_version: field.procedure_version.clone(),
            data_name: field.name.clone(),
            data_description: field.description.clone(),
            data_unit: field.unit.clone(),
            batch_data_flag,
            runs: vec![run_state; run_columns],
        }
    }

    /// Grouping key for the merge pass: every column except `stack_ref`.
    pub(crate) fn shape(&self) -> RowShape {
        RowShape {
            procedure_name: self.procedure_name.clone(),
            procedure_version: self.procedure_version.clone(),
            data_name: self.data_name.clone(),
            data_description: self.data_description.clone(),
            data_unit: self.data_unit.clone(),
            batch_data_flag: self.batch_data_flag,
            runs: self.runs.clone(),
        }
    }
}

/// Everything that identifies a row apart from which stack produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RowShape {
    procedure_name: String,
    procedure_version: String,
    data_name: String,
    data_description: String,
    data_unit: String,
    batch_data_flag: Cell,
    runs: Vec<Cell>,
}

/// Header row for a sheet with the given number of run columns.
pub fn column_headers(run_columns: usize) -> Vec<String> {
    let mut headers: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    for i in 1..=run_columns {
        headers.push(format!("run_{i}"));
    }
    headers
}
