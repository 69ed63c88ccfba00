//! Input readers for the two synthesis sources.
//!
//! This module resolves catalog and initialization files into the
//! typed records the core consumes. All structural checks on raw rows
//! happen here; the core never sees an untyped cell.

mod catalog;
mod init;
mod table;

pub use catalog::{load_catalog, parse_catalog_csv, parse_catalog_json, parse_catalog_yaml};
pub use init::{
    load_init, parse_init_csv, parse_init_json, parse_init_yaml, production_ref_from_name,
    InitFile,
};
pub use table::Table;

use serde::Deserialize;

/// A scalar that may arrive as text or as a number.
///
/// Versions and stack serials are frequently written as bare numbers
/// in JSON/YAML exports; both normalize to their text form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScalarValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl ScalarValue {
    pub(crate) fn into_string(self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}
