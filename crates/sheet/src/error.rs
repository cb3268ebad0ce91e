/// Errors from workbook reading and writing.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The file name does not carry a supported spreadsheet extension.
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    /// The workbook bytes could not be parsed.
    #[error("Workbook parse error: {0}")]
    Workbook(String),

    /// The workbook parsed but contains no worksheets.
    #[error("Workbook has no worksheets")]
    NoWorksheet,

    /// The first worksheet has no header row.
    #[error("Worksheet is missing a header row")]
    MissingHeader,

    /// Writing the output workbook failed.
    #[error("Workbook write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}
