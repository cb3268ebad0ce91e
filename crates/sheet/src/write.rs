//! Template workbook writing.

use kobopush_core::template::Template;
use rust_xlsxwriter::Workbook;

use crate::error::SheetError;

/// Worksheet name used for generated templates.
const SHEET_NAME: &str = "Template";

/// Render a template to `.xlsx` bytes: one header row, then the data
/// rows, everything as strings so the platform parses values verbatim.
pub fn template_to_xlsx(template: &Template) -> Result<Vec<u8>, SheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in template.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (row_idx, row) in template.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet.write_string((row_idx + 1) as u32, col as u16, cell)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
