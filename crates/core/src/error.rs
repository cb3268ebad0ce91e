/// Domain errors from the transformation core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed structural validation (malformed asset content, bad row).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// XML payload serialization failed.
    #[error("Payload serialization failed: {0}")]
    Payload(String),
}
