//! Workbook reading: first worksheet, first row as headers, everything
//! as trimmed strings.

use std::io::Cursor;

use calamine::{Data, Reader, Xls, Xlsx};
use kobopush_core::upload::UploadSheet;

use crate::error::SheetError;

/// Supported upload formats, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Legacy binary workbook.
    Xls,
    /// Zipped-XML workbook.
    Xlsx,
}

impl SheetFormat {
    /// Detect the format from a file name's extension
    /// (case-insensitive). Returns `None` for anything else.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".xlsx") {
            Some(Self::Xlsx)
        } else if lower.ends_with(".xls") {
            Some(Self::Xls)
        } else {
            None
        }
    }
}

/// Parse workbook bytes into an [`UploadSheet`].
///
/// Only the first worksheet is read; its first row is the header row.
pub fn read_workbook(bytes: &[u8], format: SheetFormat) -> Result<UploadSheet, SheetError> {
    let cursor = Cursor::new(bytes);
    match format {
        SheetFormat::Xlsx => {
            let mut workbook: Xlsx<_> =
                Xlsx::new(cursor).map_err(|e| SheetError::Workbook(e.to_string()))?;
            sheet_from_workbook(&mut workbook)
        }
        SheetFormat::Xls => {
            let mut workbook: Xls<_> =
                Xls::new(cursor).map_err(|e| SheetError::Workbook(e.to_string()))?;
            sheet_from_workbook(&mut workbook)
        }
    }
}

fn sheet_from_workbook<RS, R>(workbook: &mut R) -> Result<UploadSheet, SheetError>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)?
        .map_err(|e| SheetError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(SheetError::MissingHeader)?
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    let cell_rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(UploadSheet::from_rows(headers, cell_rows))
}

/// Render one cell as a string the way a data-entry user would expect:
/// integral floats lose their `.0`, booleans become `true`/`false`,
/// error cells become blank.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 9e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(SheetFormat::from_file_name("data.xlsx"), Some(SheetFormat::Xlsx));
        assert_eq!(SheetFormat::from_file_name("DATA.XLS"), Some(SheetFormat::Xls));
        assert_eq!(SheetFormat::from_file_name("template.XLSX"), Some(SheetFormat::Xlsx));
        assert_eq!(SheetFormat::from_file_name("data.csv"), None);
        assert_eq!(SheetFormat::from_file_name("noext"), None);
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("x".to_string())), "x");
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_workbook(b"not a workbook at all", SheetFormat::Xlsx).unwrap_err();
        assert!(matches!(err, SheetError::Workbook(_)));
    }
}
