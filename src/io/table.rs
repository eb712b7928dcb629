//! Data tables with by-name column lookup, read from `.csv` or `.xlsx`.
//!
//! The table keeps raw cells; columns are parsed on demand so a bad cell in a
//! column nobody asked for never aborts a run.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use csv::StringRecord;

use crate::error::AppError;

/// Tokens read as a missing value.
const NULL_TOKENS: [&str; 4] = ["nan", "na", "null", "none"];

#[derive(Debug, Clone)]
pub struct Table {
    source: String,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Row>,
}

#[derive(Debug, Clone)]
struct Row {
    line: usize,
    record: StringRecord,
}

impl Table {
    /// Read a table with a header row; the format follows the extension.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => {
                let file = File::open(path)
                    .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
                Self::from_reader(file, &path.display().to_string())
            }
            "xlsx" => Self::from_xlsx_path(path),
            _ => Err(AppError::invalid_input(format!(
                "Unsupported data file '{}': use .csv or .xlsx",
                path.display()
            ))),
        }
    }

    /// Read CSV text from any reader; `source` names it in error messages.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header_record = reader
            .headers()
            .map_err(|e| AppError::invalid_input(format!("Failed to read CSV headers of '{source}': {e}")))?
            .clone();

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result
                .map_err(|e| AppError::invalid_input(format!("CSV parse error in '{source}': {e}")))?;
            let line = record.position().map_or(i + 2, |p| p.line() as usize);
            rows.push(Row { line, record });
        }

        Self::from_records(source, &header_record, rows)
    }

    /// First worksheet of an `.xlsx` workbook; its first used row is the header.
    pub fn from_xlsx_path(path: &Path) -> Result<Self, AppError> {
        let source = path.display().to_string();
        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| AppError::io(format!("Failed to open workbook '{source}': {e}")))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::invalid_input(format!("Workbook '{source}' has no worksheet")))?
            .map_err(|e| AppError::invalid_input(format!("Failed to read worksheet of '{source}': {e}")))?;

        // Rows are reported with spreadsheet (1-based) numbers.
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut sheet_rows = range.rows().enumerate();
        let header_record = match sheet_rows.next() {
            Some((_, cells)) => cells.iter().map(cell_text).collect::<StringRecord>(),
            None => StringRecord::new(),
        };
        let rows = sheet_rows
            .map(|(i, cells)| Row {
                line: first_row + i + 1,
                record: cells.iter().map(cell_text).collect(),
            })
            .collect();

        Self::from_records(&source, &header_record, rows)
    }

    fn from_records(source: &str, header_record: &StringRecord, rows: Vec<Row>) -> Result<Self, AppError> {
        let mut headers = Vec::new();
        let mut index = HashMap::new();
        for (idx, raw) in header_record.iter().enumerate() {
            let name = normalize_header_name(raw);
            // Unnamed leading columns are row indices written by dataframe tools.
            if name.is_empty() {
                continue;
            }
            if index.insert(name.clone(), idx).is_some() {
                return Err(AppError::invalid_input(format!(
                    "Duplicate column `{name}` in '{source}'"
                )));
            }
            headers.push(name);
        }

        Ok(Self {
            source: source.to_string(),
            headers,
            index,
            rows,
        })
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize, AppError> {
        self.index.get(name).copied().ok_or_else(|| {
            AppError::invalid_input(format!(
                "Column `{name}` not found in '{}' (available: {})",
                self.source,
                self.headers.join(", ")
            ))
        })
    }

    /// Numeric column; empty and `nan`-like cells are `None`.
    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>, AppError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .map(|row| {
                let cell = row.record.get(idx).unwrap_or("");
                parse_cell(cell).map_err(|_| {
                    AppError::invalid_input(format!(
                        "Invalid number '{cell}' in column `{name}` at line {} of '{}'",
                        row.line, self.source
                    ))
                })
            })
            .collect()
    }

    /// Text column, cells as written.
    pub fn column_text(&self, name: &str) -> Result<Vec<String>, AppError> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.record.get(idx).unwrap_or("").to_string())
            .collect())
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.as_f64().to_string(),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_cell(cell: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let cell = cell.trim();
    if cell.is_empty() || NULL_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    let v = cell.parse::<f64>()?;
    Ok(v.is_finite().then_some(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const DATA: &str = "\u{feff},l,dl,T\n0,0.2,0.01,0.9\n1,0.4,,1.27\n2,0.6,0.01,nan\n";

    #[test]
    fn reads_columns_by_name_and_skips_index_column() {
        let t = Table::from_reader(DATA.as_bytes(), "mem").unwrap();
        assert_eq!(t.headers(), &["l", "dl", "T"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.column("l").unwrap(), vec![Some(0.2), Some(0.4), Some(0.6)]);
        assert_eq!(t.column("dl").unwrap(), vec![Some(0.01), None, Some(0.01)]);
        assert_eq!(t.column("T").unwrap(), vec![Some(0.9), Some(1.27), None]);
    }

    #[test]
    fn unknown_column_lists_available_names() {
        let t = Table::from_reader(DATA.as_bytes(), "mem").unwrap();
        let err = t.column("phi").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("l, dl, T"));
    }

    #[test]
    fn bad_cell_reports_line_and_column() {
        let t = Table::from_reader("x,y\n1,2\n3,abc\n".as_bytes(), "mem").unwrap();
        assert!(t.column("x").is_ok());
        let err = t.column("y").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
        assert!(err.to_string().contains("`y`"), "{err}");
    }

    #[test]
    fn text_columns_keep_cells() {
        let t = Table::from_reader("name,grade\nAnalysis I,1.7\n".as_bytes(), "mem").unwrap();
        assert_eq!(t.column_text("name").unwrap(), vec!["Analysis I"]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = Table::from_path(Path::new("data/messung.ods")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains(".csv or .xlsx"));
    }

    #[test]
    fn reads_first_worksheet_of_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messung.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["l", "T", "note"].into_iter().enumerate() {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        sheet.write_number(1, 0, 0.2).unwrap();
        sheet.write_number(1, 1, 0.9).unwrap();
        sheet.write_string(1, 2, "first").unwrap();
        sheet.write_number(2, 0, 0.4).unwrap();
        sheet.write_string(2, 2, "no time").unwrap();
        sheet.write_number(3, 0, 0.6).unwrap();
        sheet.write_string(3, 1, "abc").unwrap();
        workbook.save(&path).unwrap();

        let t = Table::from_path(&path).unwrap();
        assert_eq!(t.headers(), &["l", "T", "note"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.column("l").unwrap(), vec![Some(0.2), Some(0.4), Some(0.6)]);
        assert_eq!(t.column_text("note").unwrap(), vec!["first", "no time", ""]);

        let err = t.column("T").unwrap_err();
        assert!(err.to_string().contains("line 4"), "{err}");
    }
}
