//! Production initialization file ingestion.
//!
//! The initialization file lists one stack per row together with the
//! procedure applied to it, as CSV or as a JSON/YAML document. The
//! production reference is not a column: plant naming conventions
//! embed it in the file name as `ST` followed by two digits, and it is
//! recovered from there.

use std::path::Path;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::table::Table;
use super::ScalarValue;
use crate::core::InitEntry;

/// Candidate production references in a file name: `ST` plus a digit
/// run, matched case-insensitively. Only two-digit runs qualify.
static PRODUCTION_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)st(\d+)").expect("valid regex literal"));

/// Required columns of an initialization file.
const INIT_COLUMNS: [&str; 3] = ["stack_ref", "procedure_name", "procedure_version"];

/// A loaded initialization file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitFile {
    /// Production reference recovered from the file name, if any
    pub production_ref: Option<String>,

    /// Entries in file order
    pub entries: Vec<InitEntry>,
}

/// Load an initialization file, picking the parser from the file
/// extension.
pub fn load_init(path: &Path) -> Result<InitFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read init file {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let entries = match ext.as_str() {
        "csv" => parse_init_csv(&content),
        "json" => parse_init_json(&content),
        "yaml" | "yml" => parse_init_yaml(&content),
        other => bail!("unsupported init format {other:?} (expected csv, json, or yaml)"),
    }
    .with_context(|| format!("failed to parse init file {}", path.display()))?;

    let production_ref =
        path.file_name().and_then(|n| n.to_str()).and_then(production_ref_from_name);

    tracing::debug!(
        path = %path.display(),
        entries = entries.len(),
        production_ref = production_ref.as_deref().unwrap_or("none"),
        "Loaded init file"
    );

    Ok(InitFile { production_ref, entries })
}

/// Parse initialization CSV content. Extra columns are ignored.
pub fn parse_init_csv(content: &str) -> Result<Vec<InitEntry>> {
    let table = Table::parse(content)?;
    let columns = table.require_columns(&INIT_COLUMNS)?;

    let mut entries = Vec::with_capacity(table.len());
    for (i, row) in table.rows().iter().enumerate() {
        let row_number = i + 2;
        let cell = |column: usize| -> Result<String> {
            let value = row[columns[column]].trim();
            if value.is_empty() {
                bail!("row {row_number}: {} is empty", INIT_COLUMNS[column]);
            }
            Ok(value.to_string())
        };

        entries.push(InitEntry {
            stack_ref: cell(0)?,
            procedure_name: cell(1)?,
            procedure_version: cell(2)?,
        });
    }

    Ok(entries)
}

/// Parse a JSON initialization document: an array of entry objects.
pub fn parse_init_json(content: &str) -> Result<Vec<InitEntry>> {
    let raw: Vec<RawInitEntry> = serde_json::from_str(content).context("invalid init JSON")?;
    convert_raw_entries(raw)
}

/// Parse a YAML initialization document: a sequence of entry mappings.
pub fn parse_init_yaml(content: &str) -> Result<Vec<InitEntry>> {
    let raw: Vec<RawInitEntry> = serde_yaml::from_str(content).context("invalid init YAML")?;
    convert_raw_entries(raw)
}

/// An init entry as document sources spell it, before validation.
#[derive(Debug, Deserialize)]
struct RawInitEntry {
    stack_ref: ScalarValue,
    procedure_name: String,
    procedure_version: ScalarValue,
}

fn convert_raw_entries(raw: Vec<RawInitEntry>) -> Result<Vec<InitEntry>> {
    let mut entries = Vec::with_capacity(raw.len());
    for (i, entry) in raw.into_iter().enumerate() {
        let record_number = i + 1;
        let field = |name: &str, value: String| -> Result<String> {
            if value.is_empty() {
                bail!("record {record_number}: {name} is empty");
            }
            Ok(value)
        };

        entries.push(InitEntry {
            stack_ref: field("stack_ref", entry.stack_ref.into_string())?,
            procedure_name: field("procedure_name", entry.procedure_name.trim().to_string())?,
            procedure_version: field(
                "procedure_version",
                entry.procedure_version.into_string(),
            )?,
        });
    }
    Ok(entries)
}

/// Extract the production reference from a file name.
///
/// Takes the first `ST` followed by exactly two digits, in any case,
/// and normalizes it to upper case. Longer digit runs do not qualify.
pub fn production_ref_from_name(name: &str) -> Option<String> {
    for captures in PRODUCTION_REF.captures_iter(name) {
        let digits = &captures[1];
        if digits.len() == 2 {
            return Some(format!("ST{digits}"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_INIT: &str = "\
stack_ref,procedure_name,procedure_version
S1,P1,1
S2,P1,1
S3,P2,4
";

    #[test]
    fn test_parse_init_csv() {
        let entries = parse_init_csv(CSV_INIT).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], InitEntry::new("S1", "P1", "1"));
        assert_eq!(entries[2], InitEntry::new("S3", "P2", "4"));
    }

    #[test]
    fn test_parse_init_csv_extra_columns() {
        let content = "\
stack_ref,operator,procedure_name,procedure_version
S1,mb,P1,1
";
        let entries = parse_init_csv(content).unwrap();
        assert_eq!(entries, vec![InitEntry::new("S1", "P1", "1")]);
    }

    #[test]
    fn test_parse_init_csv_missing_column() {
        let content = "stack_ref,procedure_name\nS1,P1\n";
        let message = parse_init_csv(content).unwrap_err().to_string();
        assert!(message.contains("procedure_version"));
    }

    #[test]
    fn test_parse_init_csv_rejects_empty_cell() {
        let content = "stack_ref,procedure_name,procedure_version\nS1,,1\n";
        let message = parse_init_csv(content).unwrap_err().to_string();
        assert!(message.contains("row 2"));
        assert!(message.contains("procedure_name"));
    }

    #[test]
    fn test_parse_init_csv_trims_cells() {
        let content = "stack_ref,procedure_name,procedure_version\n S1 , P1 , 1 \n";
        let entries = parse_init_csv(content).unwrap();
        assert_eq!(entries[0], InitEntry::new("S1", "P1", "1"));
    }

    #[test]
    fn test_parse_init_json_normalizes_scalars() {
        let content = r#"[
            {"stack_ref": 101, "procedure_name": "P1", "procedure_version": 2},
            {"stack_ref": "S2", "procedure_name": "P1", "procedure_version": "2"}
        ]"#;

        let entries = parse_init_json(content).unwrap();
        assert_eq!(entries[0], InitEntry::new("101", "P1", "2"));
        assert_eq!(entries[1], InitEntry::new("S2", "P1", "2"));
    }

    #[test]
    fn test_parse_init_json_rejects_empty_name() {
        let content = r#"[{"stack_ref": "S1", "procedure_name": " ", "procedure_version": 1}]"#;
        let message = parse_init_json(content).unwrap_err().to_string();
        assert!(message.contains("record 1"));
        assert!(message.contains("procedure_name"));
    }

    #[test]
    fn test_parse_init_yaml() {
        let content = r#"
- stack_ref: S1
  procedure_name: Anodizing
  procedure_version: 3
- stack_ref: S2
  procedure_name: Anodizing
  procedure_version: 3
"#;

        let entries = parse_init_yaml(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], InitEntry::new("S1", "Anodizing", "3"));
    }

    #[test]
    fn test_production_ref_from_name() {
        assert_eq!(production_ref_from_name("init_ST42.csv"), Some("ST42".to_string()));
        assert_eq!(production_ref_from_name("st07_batch.csv"), Some("ST07".to_string()));
        assert_eq!(production_ref_from_name("prep_St99_final.csv"), Some("ST99".to_string()));
    }

    #[test]
    fn test_production_ref_requires_exactly_two_digits() {
        assert_eq!(production_ref_from_name("init_ST123.csv"), None);
        assert_eq!(production_ref_from_name("init_ST4.csv"), None);
        assert_eq!(production_ref_from_name("init_ST.csv"), None);
    }

    #[test]
    fn test_production_ref_skips_longer_runs() {
        // The three-digit candidate is passed over for the later valid one.
        assert_eq!(production_ref_from_name("st123_then_ST77.csv"), Some("ST77".to_string()));
    }

    #[test]
    fn test_production_ref_absent() {
        assert_eq!(production_ref_from_name("init.csv"), None);
        assert_eq!(production_ref_from_name("strike_force.csv"), None);
    }

    #[test]
    fn test_load_init_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init_ST42.xlsx");
        std::fs::write(&path, "not a spreadsheet").unwrap();

        let message = load_init(&path).unwrap_err().to_string();
        assert!(message.contains("unsupported init format"));
    }

    #[test]
    fn test_load_init_extracts_production_ref() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lancement_st18.csv");
        std::fs::write(&path, CSV_INIT).unwrap();

        let init = load_init(&path).unwrap();
        assert_eq!(init.production_ref.as_deref(), Some("ST18"));
        assert_eq!(init.entries.len(), 3);
    }

    #[test]
    fn test_load_init_without_production_ref() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        std::fs::write(&path, CSV_INIT).unwrap();

        let init = load_init(&path).unwrap();
        assert!(init.production_ref.is_none());
    }
}
