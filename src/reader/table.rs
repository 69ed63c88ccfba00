//! Minimal delimiter-separated table parsing.
//!
//! Handles the subset of CSV the plant tooling emits: quoted fields
//! with doubled quotes, embedded commas and line breaks, CRLF line
//! endings, and an optional UTF-8 BOM.

use anyhow::{bail, Result};

/// A parsed table: one header row plus zero or more data rows, every
/// row carrying exactly as many fields as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV text into a table.
    ///
    /// Blank records are skipped. A data row whose field count does
    /// not match the header is rejected, with rows numbered the way a
    /// spreadsheet shows them (header is row 1).
    pub fn parse(text: &str) -> Result<Self> {
        let mut records = parse_records(text)?;
        if records.is_empty() {
            bail!("table has no header row");
        }

        let headers: Vec<String> =
            records.remove(0).into_iter().map(|h| h.trim().to_string()).collect();

        for (i, row) in records.iter().enumerate() {
            if row.len() != headers.len() {
                bail!(
                    "row {} has {} fields, expected {}",
                    i + 2,
                    row.len(),
                    headers.len()
                );
            }
        }

        Ok(Self { headers, rows: records })
    }

    /// Get the header names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get the data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column's position by exact header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve all named columns, reporting every missing one at once.
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        let mut indexes = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            match self.column(name) {
                Some(index) => indexes.push(index),
                None => missing.push(*name),
            }
        }

        if !missing.is_empty() {
            bail!("missing required column(s): {}", missing.join(", "));
        }

        Ok(indexes)
    }
}

/// Split CSV text into records of raw field values.
fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    // Spreadsheet exports on Windows often lead with a BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    // Doubled quote is a literal quote
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush_record(&mut records, &mut record, &mut field);
            }
            '\n' => flush_record(&mut records, &mut record, &mut field),
            _ => field.push(c),
        }
    }

    if in_quotes {
        bail!("unterminated quoted field");
    }
    if !field.is_empty() || !record.is_empty() {
        flush_record(&mut records, &mut record, &mut field);
    }

    Ok(records)
}

/// Close the current record, dropping fully blank lines.
fn flush_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    record.push(std::mem::take(field));
    if record.len() > 1 || !record[0].is_empty() {
        records.push(std::mem::take(record));
    } else {
        record.clear();
    }
}
