//! CSV and spreadsheet loading into an untyped table
//!
//! The loader only splits the file into headers and string cells. Type
//! coercion and schema checks happen in [`crate::normalize`].

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Error, Result};

/// A parsed but untyped table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Position of a column by exact (trimmed) header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column), empty for short rows
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse delimited text into a raw table
pub fn load_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "Loaded CSV");
    Ok(RawTable { headers, rows })
}

/// Input file format, chosen by file name extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// `.csv`/`.txt` (or no extension) is delimited text, `.xlsx` a workbook
    pub fn from_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("txt") | None => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Xlsx),
            Some(other) => Err(Error::InvalidData(format!(
                "Unsupported file type: .{} (expected .csv or .xlsx)",
                other
            ))),
        }
    }
}

/// Parse the first worksheet of an `.xlsx` workbook into a raw table.
///
/// The first row is the header. Date cells are rendered as `YYYY-MM-DD`
/// and numbers in their shortest form, so both go through the same
/// coercion as CSV text.
pub fn load_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidData("Workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    debug!(columns = headers.len(), rows = rows.len(), "Loaded worksheet");
    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Parse in-memory file content in the given format
pub fn load_bytes(bytes: &[u8], format: FileFormat) -> Result<RawTable> {
    match format {
        FileFormat::Csv => load_csv(bytes),
        FileFormat::Xlsx => load_xlsx(bytes),
    }
}

/// Load a file from disk, picking the format from its extension
pub fn load_path(path: &Path) -> Result<RawTable> {
    let format = FileFormat::from_name(&path.to_string_lossy())?;
    let bytes = fs::read(path)?;
    load_bytes(&bytes, format)
}
