//! Spreadsheet I/O for the upload workflow.
//!
//! Reads user workbooks — legacy binary (`.xls`) and zipped-XML
//! (`.xlsx`) — into untyped [`kobopush_core::upload::UploadSheet`] rows,
//! and writes core [`kobopush_core::template::Template`] values out as
//! `.xlsx` bytes.

pub mod error;
pub mod read;
pub mod write;

pub use error::SheetError;
pub use read::{read_workbook, SheetFormat};
pub use write::template_to_xlsx;
