//! Procedure catalog ingestion.
//!
//! Resolves a tabular (CSV) or document (JSON/YAML) catalog source
//! into typed field records, rejecting malformed rows before they
//! reach the synthesis core.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use super::table::Table;
use super::ScalarValue;
use crate::core::{DataKind, FieldRecord, Perimeter};

/// Column set of a tabular catalog source.
const CATALOG_COLUMNS: [&str; 12] = [
    "procedure_name",
    "procedure_version",
    "linked_block",
    "data_name",
    "data_description",
    "recipe_value",
    "data_type",
    "data_unit",
    "data_min_value",
    "data_max_value",
    "data_origin",
    "data_perimeter",
];

/// Load a catalog file, picking the parser from the file extension.
pub fn load_catalog(path: &Path) -> Result<Vec<FieldRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let fields = match ext.as_str() {
        "csv" => parse_catalog_csv(&content),
        "json" => parse_catalog_json(&content),
        "yaml" | "yml" => parse_catalog_yaml(&content),
        other => bail!("unsupported catalog format {other:?} (expected csv, json, or yaml)"),
    }
    .with_context(|| format!("failed to parse catalog {}", path.display()))?;

    tracing::debug!(path = %path.display(), records = fields.len(), "Loaded catalog");

    Ok(fields)
}

/// Parse a CSV catalog. All twelve catalog columns must be present;
/// extra columns are ignored.
pub fn parse_catalog_csv(content: &str) -> Result<Vec<FieldRecord>> {
    let table = Table::parse(content)?;
    let columns = table.require_columns(&CATALOG_COLUMNS)?;

    let mut fields = Vec::with_capacity(table.len());
    for (i, row) in table.rows().iter().enumerate() {
        // Rows numbered as a spreadsheet shows them; header is row 1.
        let row_number = i + 2;
        let cell = |column: usize| row[columns[column]].trim();

        let field = FieldRecord {
            procedure_name: required_cell(row_number, "procedure_name", cell(0))?,
            procedure_version: required_cell(row_number, "procedure_version", cell(1))?,
            linked_block: required_cell(row_number, "linked_block", cell(2))?,
            name: required_cell(row_number, "data_name", cell(3))?,
            description: cell(4).to_string(),
            recipe_value: optional_cell(cell(5)),
            kind: DataKind::parse(cell(6)),
            unit: cell(7).to_string(),
            min_value: numeric_cell(row_number, "data_min_value", cell(8))?,
            max_value: numeric_cell(row_number, "data_max_value", cell(9))?,
            origin: optional_cell(cell(10)),
            perimeter: parse_perimeter(row_number, cell(11))?,
        };
        fields.push(field);
    }

    Ok(fields)
}

/// Parse a JSON catalog: an array of field record objects.
pub fn parse_catalog_json(content: &str) -> Result<Vec<FieldRecord>> {
    let raw: Vec<RawFieldRecord> =
        serde_json::from_str(content).context("invalid catalog JSON")?;
    convert_raw_records(raw)
}

/// Parse a YAML catalog: a sequence of field record mappings.
pub fn parse_catalog_yaml(content: &str) -> Result<Vec<FieldRecord>> {
    let raw: Vec<RawFieldRecord> =
        serde_yaml::from_str(content).context("invalid catalog YAML")?;
    convert_raw_records(raw)
}

fn required_cell(row: usize, column: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        bail!("row {row}: {column} is empty");
    }
    Ok(value.to_string())
}

fn optional_cell(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn numeric_cell(row: usize, column: &str, value: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| anyhow!("row {row}: invalid {column} {value:?}"))
}

fn parse_perimeter(row: usize, value: &str) -> Result<Perimeter> {
    Perimeter::parse(value)
        .ok_or_else(|| anyhow!("row {row}: unknown data_perimeter {value:?} (expected run or batch)"))
}

/// A catalog record as document sources spell it, before validation.
///
/// Versions and recipe values are frequently written as bare numbers
/// in JSON/YAML exports, so both accept any scalar and normalize to
/// its text form.
#[derive(Debug, Deserialize)]
struct RawFieldRecord {
    procedure_name: String,
    procedure_version: ScalarValue,
    linked_block: String,
    data_name: String,
    #[serde(default)]
    data_description: String,
    #[serde(default)]
    data_unit: String,
    data_type: String,
    data_perimeter: String,
    #[serde(default)]
    recipe_value: Option<ScalarValue>,
    #[serde(default)]
    data_min_value: Option<f64>,
    #[serde(default)]
    data_max_value: Option<f64>,
    #[serde(default)]
    data_origin: Option<String>,
}

fn convert_raw_records(raw: Vec<RawFieldRecord>) -> Result<Vec<FieldRecord>> {
    raw.into_iter()
        .enumerate()
        .map(|(i, record)| convert_raw(i + 1, record))
        .collect()
}

fn convert_raw(record_number: usize, raw: RawFieldRecord) -> Result<FieldRecord> {
    let perimeter = Perimeter::parse(&raw.data_perimeter).ok_or_else(|| {
        anyhow!(
            "record {record_number}: unknown data_perimeter {:?} (expected run or batch)",
            raw.data_perimeter
        )
    })?;

    let field = FieldRecord {
        procedure_name: required_cell(record_number, "procedure_name", raw.procedure_name.trim())?,
        procedure_version: required_cell(
            record_number,
            "procedure_version",
            &raw.procedure_version.into_string(),
        )?,
        linked_block: required_cell(record_number, "linked_block", raw.linked_block.trim())?,
        name: required_cell(record_number, "data_name", raw.data_name.trim())?,
        description: raw.data_description.trim().to_string(),
        unit: raw.data_unit.trim().to_string(),
        kind: DataKind::parse(&raw.data_type),
        perimeter,
        recipe_value: raw.recipe_value.map(ScalarValue::into_string),
        min_value: raw.data_min_value,
        max_value: raw.data_max_value,
        origin: raw.data_origin.map(|o| o.trim().to_string()),
    };

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_CATALOG: &str = "\
procedure_name,procedure_version,linked_block,data_name,data_description,recipe_value,data_type,data_unit,data_min_value,data_max_value,data_origin,data_perimeter
P1,1,B1,temp,Bath temperature,20,production,degC,18,22,operator,run
P1,1,B1,pressure,,,production,bar,,,,batch
P1,1,B1,note,Shift notes,,other,,,,,run
";

    #[test]
    fn test_parse_csv_catalog() {
        let fields = parse_catalog_csv(CSV_CATALOG).unwrap();
        assert_eq!(fields.len(), 3);

        let temp = &fields[0];
        assert_eq!(temp.procedure_name, "P1");
        assert_eq!(temp.procedure_version, "1");
        assert_eq!(temp.linked_block, "B1");
        assert_eq!(temp.name, "temp");
        assert_eq!(temp.description, "Bath temperature");
        assert_eq!(temp.unit, "degC");
        assert_eq!(temp.kind, DataKind::Production);
        assert_eq!(temp.perimeter, Perimeter::Run);
        assert_eq!(temp.recipe_value.as_deref(), Some("20"));
        assert_eq!(temp.min_value, Some(18.0));
        assert_eq!(temp.max_value, Some(22.0));
        assert_eq!(temp.origin.as_deref(), Some("operator"));

        let pressure = &fields[1];
        assert_eq!(pressure.perimeter, Perimeter::Batch);
        assert!(pressure.recipe_value.is_none());
        assert!(pressure.min_value.is_none());
        assert!(pressure.max_value.is_none());
        assert!(pressure.origin.is_none());

        assert_eq!(fields[2].kind, DataKind::Other);
    }

    #[test]
    fn test_parse_csv_keeps_row_order() {
        let fields = parse_catalog_csv(CSV_CATALOG).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["temp", "pressure", "note"]);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let content = "procedure_name,procedure_version\nP1,1\n";
        let message = parse_catalog_csv(content).unwrap_err().to_string();
        assert!(message.contains("missing required column"));
        assert!(message.contains("linked_block"));
        assert!(message.contains("data_perimeter"));
    }

    #[test]
    fn test_parse_csv_extra_columns_are_ignored() {
        let content = "\
site,procedure_name,procedure_version,linked_block,data_name,data_description,recipe_value,data_type,data_unit,data_min_value,data_max_value,data_origin,data_perimeter
X,P1,1,B1,temp,,,production,,,,,run
";
        let fields = parse_catalog_csv(content).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "temp");
    }

    #[test]
    fn test_parse_csv_rejects_unknown_perimeter() {
        let content = "\
procedure_name,procedure_version,linked_block,data_name,data_description,recipe_value,data_type,data_unit,data_min_value,data_max_value,data_origin,data_perimeter
P1,1,B1,temp,,,production,,,,,per-run
";
        let message = parse_catalog_csv(content).unwrap_err().to_string();
        assert!(message.contains("row 2"));
        assert!(message.contains("per-run"));
    }

    #[test]
    fn test_parse_csv_rejects_bad_limit() {
        let content = "\
procedure_name,procedure_version,linked_block,data_name,data_description,recipe_value,data_type,data_unit,data_min_value,data_max_value,data_origin,data_perimeter
P1,1,B1,temp,,,production,,abc,,,run
";
        let message = parse_catalog_csv(content).unwrap_err().to_string();
        assert!(message.contains("data_min_value"));
        assert!(message.contains("abc"));
    }

    #[test]
    fn test_parse_csv_rejects_empty_required_cell() {
        let content = "\
procedure_name,procedure_version,linked_block,data_name,data_description,recipe_value,data_type,data_unit,data_min_value,data_max_value,data_origin,data_perimeter
,1,B1,temp,,,production,,,,,run
";
        let message = parse_catalog_csv(content).unwrap_err().to_string();
        assert!(message.contains("row 2"));
        assert!(message.contains("procedure_name"));
    }

    #[test]
    fn test_parse_csv_header_only() {
        let header = CSV_CATALOG.lines().next().unwrap();
        let fields = parse_catalog_csv(&format!("{header}\n")).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_parse_json_catalog_normalizes_numeric_versions() {
        let content = r#"[
            {
                "procedure_name": "P1",
                "procedure_version": 2,
                "linked_block": "B1",
                "data_name": "temp",
                "data_type": "production",
                "data_perimeter": "run",
                "recipe_value": 20.5
            },
            {
                "procedure_name": "P1",
                "procedure_version": "2.1",
                "linked_block": "B1",
                "data_name": "pressure",
                "data_unit": "bar",
                "data_type": "Production",
                "data_perimeter": "Batch",
                "data_min_value": 0.8,
                "data_max_value": 1.2
            }
        ]"#;

        let fields = parse_catalog_json(content).unwrap();
        assert_eq!(fields.len(), 2);

        assert_eq!(fields[0].procedure_version, "2");
        assert_eq!(fields[0].recipe_value.as_deref(), Some("20.5"));
        assert_eq!(fields[0].description, "");

        assert_eq!(fields[1].procedure_version, "2.1");
        assert_eq!(fields[1].kind, DataKind::Production);
        assert_eq!(fields[1].perimeter, Perimeter::Batch);
        assert_eq!(fields[1].min_value, Some(0.8));
    }

    #[test]
    fn test_parse_json_rejects_missing_required_key() {
        let content = r#"[{"procedure_name": "P1"}]"#;
        assert!(parse_catalog_json(content).is_err());
    }

    #[test]
    fn test_parse_json_rejects_unknown_perimeter() {
        let content = r#"[
            {
                "procedure_name": "P1",
                "procedure_version": 1,
                "linked_block": "B1",
                "data_name": "temp",
                "data_type": "production",
                "data_perimeter": "weekly"
            }
        ]"#;

        let message = parse_catalog_json(content).unwrap_err().to_string();
        assert!(message.contains("record 1"));
        assert!(message.contains("weekly"));
    }

    #[test]
    fn test_parse_yaml_catalog() {
        let content = r#"
- procedure_name: P1
  procedure_version: 3
  linked_block: B2
  data_name: thickness
  data_description: Coating thickness
  data_unit: um
  data_type: production
  data_perimeter: run
- procedure_name: P1
  procedure_version: 3
  linked_block: B2
  data_name: operator_badge
  data_type: traceability
  data_perimeter: batch
"#;

        let fields = parse_catalog_yaml(content).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].procedure_version, "3");
        assert_eq!(fields[0].unit, "um");
        assert_eq!(fields[1].kind, DataKind::Other);
    }

    #[test]
    fn test_load_catalog_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xml");
        std::fs::write(&path, "<catalog/>").unwrap();

        let message = load_catalog(&path).unwrap_err().to_string();
        assert!(message.contains("unsupported catalog format"));
    }

    #[test]
    fn test_load_catalog_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        std::fs::write(&path, CSV_CATALOG).unwrap();

        let fields = load_catalog(&path).unwrap();
        assert_eq!(fields.len(), 3);
    }
}
