//! CSV sheet emission.
//!
//! One file per equipment block, named after the block. Locked cells
//! carry the `N/A` marker; editable cells are left empty for the
//! operator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{column_headers, Cell, Logbook, LogbookRow};

/// Marker written into locked cells.
pub const LOCKED_MARKER: &str = "N/A";

/// Render one sheet as CSV text with CRLF record endings.
pub fn render_sheet(rows: &[LogbookRow], run_columns: usize) -> String {
    let mut records = Vec::with_capacity(rows.len() + 1);
    records.push(format_record(&column_headers(run_columns)));
    for row in rows {
        records.push(format_record(&row_cells(row)));
    }

    let mut out = records.join("\r\n");
    out.push_str("\r\n");
    out
}

/// Write every sheet of the logbook into `dir`, one file per block.
/// Returns the written paths in sheet order.
pub fn write_sheets(logbook: &Logbook, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(logbook.sheet_count());
    for (block, rows) in logbook.sheets() {
        let path = dir.join(sheet_file_name(block));

        // Excel detects UTF-8 through the BOM.
        let mut content = String::from('\u{feff}');
        content.push_str(&render_sheet(rows, logbook.run_columns()));

        std::fs::write(&path, content)
            .with_context(|| format!("failed to write sheet {}", path.display()))?;
        tracing::debug!(block, path = %path.display(), rows = rows.len(), "Wrote sheet");
        written.push(path);
    }

    Ok(written)
}

/// File name for a block's sheet, with path-hostile characters
/// replaced by underscores.
pub fn sheet_file_name(block: &str) -> String {
    let safe: String = block
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    format!("{safe}.csv")
}

fn row_cells(row: &LogbookRow) -> Vec<String> {
    let mut cells = vec![
        row.stack_ref.clone(),
        row.procedure_name.clone(),
        row.procedure_version.clone(),
        row.data_name.clone(),
        row.data_description.clone(),
        row.data_unit.clone(),
        cell_text(row.batch_data_flag).to_string(),
    ];
    cells.extend(row.runs.iter().map(|cell| cell_text(*cell).to_string()));
    cells
}

fn cell_text(cell: Cell) -> &'static str {
    match cell {
        Cell::Editable => "",
        Cell::Locked => LOCKED_MARKER,
    }
}

fn format_record(cells: &[String]) -> String {
    cells.iter().map(|cell| quote(cell)).collect::<Vec<_>>().join(",")
}

/// Quote a field when it contains a separator, quote, or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{synthesize, CatalogIndex, FieldRecord, InitEntry, Perimeter};
    use crate::reader::Table;

    fn sample_logbook(run_columns: usize) -> Logbook {
        let index = CatalogIndex::build(vec![
            FieldRecord::new("P1", "1", "B1", "temp")
                .with_description("Bath temperature")
                .with_unit("degC"),
            FieldRecord::new("P1", "1", "B1", "pressure")
                .with_unit("bar")
                .with_perimeter(Perimeter::Batch),
        ])
        .unwrap();
        let entries = vec![InitEntry::new("S1", "P1", "1"), InitEntry::new("S2", "P1", "1")];
        synthesize(&index, &entries, run_columns).unwrap()
    }

    #[test]
    fn test_render_sheet_header_and_rows() {
        let logbook = sample_logbook(2);
        let text = render_sheet(logbook.sheet("B1").unwrap(), 2);
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(
            lines[0],
            "stack_ref,procedure_name,procedure_version,data_name,data_description,data_unit,batch_data_flag,run_1,run_2"
        );
        // Merged stack list contains the separator, so it is quoted.
        assert_eq!(lines[1], "\"S1, S2\",P1,1,temp,Bath temperature,degC,N/A,,");
        assert_eq!(lines[2], "\"S1, S2\",P1,1,pressure,,bar,,N/A,N/A");
        // Trailing record terminator
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_render_sheet_roundtrips_through_table_parser() {
        let logbook = sample_logbook(3);
        let text = render_sheet(logbook.sheet("B1").unwrap(), 3);

        let table = Table::parse(&text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.headers().len(), 10);
        assert_eq!(table.rows()[0][0], "S1, S2");
        assert_eq!(table.rows()[0][6], "N/A");
        assert_eq!(table.rows()[1][7], "N/A");
        assert_eq!(table.rows()[1][6], "");
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_sheet_file_name_sanitizes() {
        assert_eq!(sheet_file_name("B1"), "B1.csv");
        assert_eq!(sheet_file_name("Line 2/Anodizing"), "Line_2_Anodizing.csv");
        assert_eq!(sheet_file_name("bloc:élec"), "bloc_élec.csv");
    }

    #[test]
    fn test_write_sheets_creates_one_file_per_block() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sheets");
        let logbook = sample_logbook(2);

        let written = write_sheets(&logbook, &out).unwrap();
        assert_eq!(written, vec![out.join("B1.csv")]);

        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.starts_with('\u{feff}'));

        // The emitted file parses back with the same shape.
        let table = Table::parse(&content).unwrap();
        assert_eq!(table.headers()[0], "stack_ref");
        assert_eq!(table.len(), 2);
    }
}
