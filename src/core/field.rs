//! Catalog field records.
//!
//! Defines the `FieldRecord` struct that represents one measurable
//! attribute of a procedure, as ingested from the procedure catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scope of a measured field: once per run, or once per batch of runs.
///
/// The perimeter drives the locking rule during synthesis, so an
/// unrecognized label is rejected at ingestion rather than defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perimeter {
    /// One value expected per run column.
    Run,

    /// One value expected per batch; run columns are not applicable.
    Batch,
}

impl Perimeter {
    /// Parse a catalog label (case-insensitive, surrounding whitespace ignored).
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("run") {
            Some(Self::Run)
        } else if label.eq_ignore_ascii_case("batch") {
            Some(Self::Batch)
        } else {
            None
        }
    }

    /// Get the canonical label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for Perimeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a field carries production measurements or auxiliary data.
///
/// Only production fields participate in logbook synthesis; everything
/// else in the catalog normalizes to `Other` and rides along for
/// inspection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Measured during production; becomes a logbook row.
    Production,

    /// Anything else (setup values, documentation fields, ...).
    Other,
}

impl DataKind {
    /// Parse a catalog label. Any label other than `production`
    /// (case-insensitive) is `Other`.
    pub fn parse(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Other
        }
    }

    /// Get the canonical label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a procedure: its name plus its version.
///
/// Versions compare by string equality only; `"2"` and `"2.0"` are
/// different procedures as far as the catalog is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcedureKey {
    /// Procedure name as it appears in the catalog
    pub name: String,

    /// Procedure version as it appears in the catalog
    pub version: String,
}

impl ProcedureKey {
    /// Create a key from name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into() }
    }
}

impl fmt::Display for ProcedureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// One measurable attribute of a procedure, as read from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Name of the procedure this field belongs to
    pub procedure_name: String,

    /// Version of the procedure this field belongs to
    pub procedure_version: String,

    /// Equipment block the procedure's production data is routed to
    pub linked_block: String,

    /// Field name shown in the logbook
    #[serde(rename = "data_name")]
    pub name: String,

    /// Human-readable description of the measurement
    #[serde(rename = "data_description", default)]
    pub description: String,

    /// Measurement unit
    #[serde(rename = "data_unit", default)]
    pub unit: String,

    /// Production vs auxiliary data
    #[serde(rename = "data_type")]
    pub kind: DataKind,

    /// Run-scoped vs batch-scoped
    #[serde(rename = "data_perimeter")]
    pub perimeter: Perimeter,

    /// Nominal value prescribed by the recipe (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_value: Option<String>,

    /// Lower acceptance limit (if any)
    #[serde(rename = "data_min_value", default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    /// Upper acceptance limit (if any)
    #[serde(rename = "data_max_value", default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    /// Where the value comes from (operator entry, sensor, ...)
    #[serde(rename = "data_origin", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl FieldRecord {
    /// Create a production, run-scoped field with empty description and unit.
    pub fn new(
        procedure_name: impl Into<String>,
        procedure_version: impl Into<String>,
        linked_block: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            procedure_name: procedure_name.into(),
            procedure_version: procedure_version.into(),
            linked_block: linked_block.into(),
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            kind: DataKind::Production,
            perimeter: Perimeter::Run,
            recipe_value: None,
            min_value: None,
            max_value: None,
            origin: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the measurement unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the data kind.
    #[must_use]
    pub fn with_kind(mut self, kind: DataKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the perimeter.
    #[must_use]
    pub fn with_perimeter(mut self, perimeter: Perimeter) -> Self {
        self.perimeter = perimeter;
        self
    }

    /// Set the recipe value.
    #[must_use]
    pub fn with_recipe_value(mut self, value: impl Into<String>) -> Self {
        self.recipe_value = Some(value.into());
        self
    }

    /// Set the acceptance limits.
    #[must_use]
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Set the data origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Get the (name, version) key of the owning procedure.
    pub fn key(&self) -> ProcedureKey {
        ProcedureKey::new(self.procedure_name.clone(), self.procedure_version.clone())
    }

    /// Check whether this field participates in logbook synthesis.
    pub const fn is_production(&self) -> bool {
        matches!(self.kind, DataKind::Production)
    }
}
