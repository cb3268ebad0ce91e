use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use kobopush_core::error::CoreError;
use kobopush_kobo::KoboApiError;
use kobopush_sheet::SheetError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of the core, client, and sheet crates and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent `{ "error": ..., "code": ... }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A transformation error from `kobopush_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A platform API error from `kobopush_kobo`.
    #[error(transparent)]
    Kobo(#[from] KoboApiError),

    /// A workbook error from `kobopush_sheet`.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource (unknown session, no report yet, ...).
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Core errors ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Payload(msg) => {
                    tracing::error!(error = %msg, "Payload serialization error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Platform API errors ---
            AppError::Kobo(kobo) => classify_kobo_error(kobo),

            // --- Workbook errors ---
            AppError::Sheet(sheet) => match sheet {
                SheetError::Write(e) => {
                    tracing::error!(error = %e, "Workbook write error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                other => (StatusCode::BAD_REQUEST, "BAD_UPLOAD", other.to_string()),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a platform API error into an HTTP status, error code, and message.
///
/// - Rejected credentials map to 401.
/// - Answered platform errors map to 502 (the upstream spoke, badly).
/// - Export timeouts map to 504.
fn classify_kobo_error(err: &KoboApiError) -> (StatusCode, &'static str, String) {
    match err {
        KoboApiError::Unauthorized { .. } => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "The platform rejected the API token".to_string(),
        ),
        KoboApiError::Request(e) => {
            tracing::error!(error = %e, "Platform request failed");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNREACHABLE",
                "Could not reach the platform".to_string(),
            )
        }
        KoboApiError::ExportTimeout(secs) => (
            StatusCode::GATEWAY_TIMEOUT,
            "UPSTREAM_TIMEOUT",
            format!("Export did not complete within {secs} seconds"),
        ),
        other => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", other.to_string()),
    }
}
