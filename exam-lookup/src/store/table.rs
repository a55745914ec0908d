//! Raw tabular source parsing and writing
//!
//! Cohort sources are spreadsheet workbooks (first sheet) or CSV, both with a
//! header row. The same cleaning rules apply to either format, at startup
//! load and when an update is ingested: header cells are trimmed, ragged rows
//! are padded, and rows with no non-blank cell are dropped.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;

use super::value::format_number;
use crate::error::{LookupError, Result};

/// On-disk layout of a cohort source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Format implied by a file extension; anything unrecognised is CSV
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => SourceFormat::Workbook,
            _ => SourceFormat::Csv,
        }
    }

    /// Format of raw bytes: zip (xlsx/ods) or OLE (xls) containers are
    /// workbooks, everything else is read as CSV
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP: &[u8] = b"PK\x03\x04";
        const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
        if bytes.starts_with(ZIP) || bytes.starts_with(OLE) {
            SourceFormat::Workbook
        } else {
            SourceFormat::Csv
        }
    }
}

/// Header plus cleaned rows of raw cell text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse CSV from any reader; `origin` names the source in errors
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| malformed(origin, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| malformed(origin, e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::cleaned(headers, rows, origin)
    }

    /// Parse the first sheet of a workbook
    pub fn from_workbook(bytes: &[u8], origin: &str) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| malformed(origin, e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| malformed(origin, "workbook has no sheets".to_string()))?
            .map_err(|e| malformed(origin, e.to_string()))?;

        let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        Self::cleaned(headers, rows.collect(), origin)
    }

    /// Parse bytes in whichever format they are in
    pub fn from_bytes(bytes: &[u8], origin: &str) -> Result<Self> {
        match SourceFormat::sniff(bytes) {
            SourceFormat::Workbook => Self::from_workbook(bytes, origin),
            SourceFormat::Csv => Self::from_reader(bytes, origin),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| malformed(&origin, e.to_string()))?;
        Self::from_bytes(&bytes, &origin)
    }

    fn cleaned(headers: Vec<String>, raw_rows: Vec<Vec<String>>, origin: &str) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(malformed(origin, "missing header row".to_string()));
        }

        let width = headers.len();
        let rows = raw_rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// Serialize as CSV (header row first)
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let to_io = |e: csv::Error| LookupError::Io(std::io::Error::other(e.to_string()));

        csv_writer.write_record(&self.headers).map_err(to_io)?;
        for row in &self.rows {
            csv_writer.write_record(row).map_err(to_io)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Serialize as a single-sheet xlsx workbook
    ///
    /// Cells whose text is exactly a formatted number are written as numbers;
    /// everything else (leading-zero identifiers included) stays text.
    pub fn to_workbook(&self) -> Result<Vec<u8>> {
        let to_io =
            |e: rust_xlsxwriter::XlsxError| LookupError::Io(std::io::Error::other(e.to_string()));

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in std::iter::once(&self.headers).chain(&self.rows).enumerate() {
            let r = u32::try_from(r)
                .map_err(|_| LookupError::Io(std::io::Error::other("too many rows")))?;
            for (c, cell) in row.iter().enumerate() {
                let c = u16::try_from(c)
                    .map_err(|_| LookupError::Io(std::io::Error::other("too many columns")))?;
                let text = cell.trim();
                if text.is_empty() {
                    continue;
                }
                match text.parse::<f64>() {
                    Ok(n) if r > 0 && n.is_finite() && format_number(n) == text => {
                        sheet.write_number(r, c, n).map_err(to_io)?;
                    }
                    _ => {
                        sheet.write_string(r, c, cell).map_err(to_io)?;
                    }
                }
            }
        }
        workbook.save_to_buffer().map_err(to_io)
    }

    /// Serialize in the given format
    pub fn to_bytes(&self, format: SourceFormat) -> Result<Vec<u8>> {
        match format {
            SourceFormat::Workbook => self.to_workbook(),
            SourceFormat::Csv => {
                let mut bytes = Vec::new();
                self.write_to(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    /// Index of a header
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text, empty for out-of-range access
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn malformed(origin: &str, reason: String) -> LookupError {
    LookupError::MalformedSource {
        path: origin.to_string(),
        reason,
    }
}

/// Workbook cell as raw text; dates become spreadsheet serial numbers
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(n) if r > 0 => sheet.write_number(r as u32, c as u16, n).unwrap(),
                    _ => sheet.write_string(r as u32, c as u16, *cell).unwrap(),
                };
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_headers_trimmed_and_empty_rows_dropped() {
        let csv = "Number , Name ,Math\n51234,Ahmad,80\n,,\n  , ,\n52000,Sara,45\n";
        let table = RawTable::from_bytes(csv.as_bytes(), "test").unwrap();

        assert_eq!(table.headers, vec!["Number", "Name", "Math"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(1, 1), "Sara");
    }

    #[test]
    fn test_ragged_rows_padded_and_truncated() {
        let csv = "A,B,C\n1,2\n1,2,3,4\n";
        let table = RawTable::from_bytes(csv.as_bytes(), "test").unwrap();

        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let result = RawTable::from_bytes(b"", "empty.csv");
        assert!(matches!(
            result,
            Err(LookupError::MalformedSource { ref path, .. }) if path == "empty.csv"
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let result = RawTable::from_bytes(b"Number,Name\n1,\xff\xfe\n", "bad.csv");
        assert!(matches!(result, Err(LookupError::MalformedSource { .. })));
    }

    #[test]
    fn test_write_then_parse_preserves_quoted_cells() {
        let table = RawTable {
            headers: vec!["Number".into(), "Name".into()],
            rows: vec![vec!["51234".into(), "Ahmad, Jr.".into()]],
        };
        let bytes = table.to_bytes(SourceFormat::Csv).unwrap();

        let parsed = RawTable::from_bytes(&bytes, "roundtrip").unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let result = RawTable::from_path(Path::new("/nonexistent/results_2099.xlsx"));
        assert!(matches!(result, Err(LookupError::MalformedSource { .. })));
    }

    #[test]
    fn test_workbook_gets_the_same_cleaning() {
        let bytes = workbook(&[
            &[" Number ", "Name", "Math"],
            &["51234", "Ahmad", "80"],
            &["", "", ""],
            &["52000", "Sara", "45.5"],
        ]);
        let table = RawTable::from_bytes(&bytes, "results_2025.xlsx").unwrap();

        assert_eq!(table.headers, vec!["Number", "Name", "Math"]);
        assert_eq!(table.rows.len(), 2);
        // Integral floats come back without a fraction
        assert_eq!(table.rows[0], vec!["51234", "Ahmad", "80"]);
        assert_eq!(table.cell(1, 2), "45.5");
    }

    #[test]
    fn test_workbook_output_reads_back() {
        let table = RawTable {
            headers: vec!["Number".into(), "Name".into(), "Math".into()],
            rows: vec![
                vec!["051234".into(), "Ahmad".into(), "80".into()],
                vec!["52000".into(), "Sara".into(), "".into()],
            ],
        };
        let bytes = table.to_bytes(SourceFormat::Workbook).unwrap();
        assert_eq!(SourceFormat::sniff(&bytes), SourceFormat::Workbook);

        let parsed = RawTable::from_bytes(&bytes, "out.xlsx").unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a/results_2025.XLSX")), SourceFormat::Workbook);
        assert_eq!(SourceFormat::from_path(Path::new("results_2025.csv")), SourceFormat::Csv);
        assert_eq!(SourceFormat::sniff(b"Number,Name\n"), SourceFormat::Csv);
    }

    #[test]
    fn test_garbage_workbook_is_malformed() {
        let result = RawTable::from_bytes(b"PK\x03\x04not really a zip", "upload");
        assert!(matches!(result, Err(LookupError::MalformedSource { .. })));
    }
}
