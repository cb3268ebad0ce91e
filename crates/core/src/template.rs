//! In-memory template sheets: a header row plus zero or more data rows.
//!
//! Writing the actual workbook bytes is the sheet crate's job; this module
//! only decides what goes in which cell.

use serde_json::{Map, Value};

/// A rectangular sheet: one header row and `rows.len()` data rows, each
/// exactly `columns.len()` cells wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Template {
    /// A blank template: header only, zero data rows.
    pub fn blank(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// A pre-filled template: one data row per submission, values placed
    /// under their matching column. A submission missing a column yields
    /// an empty cell, never an error.
    pub fn filled(columns: Vec<String>, submissions: &[Map<String, Value>]) -> Self {
        let rows = submissions
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(render_value).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }
}

/// Render a JSON value for a spreadsheet cell.
///
/// Strings pass through; numbers and booleans use their display form;
/// null renders empty. Nested structures (which the data API does not
/// normally return for flattened records) fall back to compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
