use crate::error::{MisrankError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// A parsed tabular file. Cells stay strings until the column selector
/// coerces them; ragged rows are padded to the header width.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row][column].as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Spreadsheet,
}

/// Format is decided by the extension alone, case-insensitively. Content
/// sniffing is deliberately out of scope.
pub fn detect_format(path: &Path) -> Result<TableFormat> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(TableFormat::Csv),
        "tsv" => Ok(TableFormat::Tsv),
        "xlsx" | "xls" => Ok(TableFormat::Spreadsheet),
        _ => Err(MisrankError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn load_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(MisrankError::FileNotFound(path.display().to_string()));
    }

    match detect_format(path)? {
        TableFormat::Csv => read_delimited(path, b','),
        TableFormat::Tsv => read_delimited(path, b'\t'),
        TableFormat::Spreadsheet => read_spreadsheet(path),
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(|cell| cell.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| MisrankError::Spreadsheet(format!("{}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            MisrankError::Spreadsheet(format!("{}: workbook has no sheets", path.display()))
        })?
        .map_err(|e| MisrankError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for sheet_row in row_iter {
        let mut row: Vec<String> = sheet_row.iter().map(cell_to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}
