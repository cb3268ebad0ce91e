//! Template and data downloads (workflow step four preparation).

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::IntoResponse;
use uuid::Uuid;

use kobopush_core::template::Template;
use kobopush_kobo::KoboClient;
use kobopush_sheet::template_to_xlsx;

use crate::error::AppResult;
use crate::handlers::{get_session, selected_project};
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Wrap workbook bytes as a file-download response.
fn xlsx_attachment(filename: String, bytes: Vec<u8>) -> impl IntoResponse {
    let headers: [(HeaderName, String); 2] = [
        (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    (headers, bytes)
}

/// GET /api/v1/sessions/{session_id}/template
///
/// Blank template for the selected project: header row only.
pub async fn download_template(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = get_session(&state, session_id).await?;
    let project = selected_project(&session)?;

    let template = Template::blank(project.columns);
    let bytes = template_to_xlsx(&template)?;

    Ok(xlsx_attachment(
        format!("{}_template.xlsx", project.form_id),
        bytes,
    ))
}

/// GET /api/v1/sessions/{session_id}/data
///
/// Template pre-filled with the project's current submissions, for
/// editing offline.
pub async fn download_data(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = get_session(&state, session_id).await?;
    let project = selected_project(&session)?;

    let client = KoboClient::new(session.kobo);
    let submissions = client.list_submissions(&project.uid).await?;
    let template = Template::filled(project.columns, &submissions);
    let bytes = template_to_xlsx(&template)?;

    Ok(xlsx_attachment(format!("{}_data.xlsx", project.form_id), bytes))
}

/// GET /api/v1/sessions/{session_id}/export
///
/// Platform-generated full export of the project's data.
pub async fn download_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = get_session(&state, session_id).await?;
    let project = selected_project(&session)?;

    let client = KoboClient::new(session.kobo);
    let bytes = client.export_data(&project.uid).await?;

    Ok(xlsx_attachment(
        format!("{}_export.xlsx", project.form_id),
        bytes,
    ))
}
