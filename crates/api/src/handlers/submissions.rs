//! Upload intake and the per-row submission loop (workflow step five).
//!
//! Rows are processed strictly in sheet order, one platform call at a
//! time. One bad row never aborts the batch; only transport loss halts
//! the run, and even then every attempted row keeps its recorded outcome.

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use kobopush_core::ident::{match_row, normalize_identifier_headers, IdentifierIndex, MatchResult};
use kobopush_core::payload::build_submission_xml;
use kobopush_core::report::{RowOutcome, SubmissionReport};
use kobopush_core::upload::UploadSheet;
use kobopush_kobo::KoboClient;
use kobopush_sheet::{read_workbook, SheetError, SheetFormat};

use crate::error::{AppError, AppResult};
use crate::handlers::{get_session, selected_project};
use crate::response::DataResponse;
use crate::state::{AppState, RunReport, SelectedProject, SubmitMode};

/// POST /api/v1/sessions/{session_id}/submissions
///
/// Accept a multipart upload with a `file` part (the filled workbook)
/// and a `mode` part (`new` or `edit`), run the submission loop, and
/// return the per-row report.
pub async fn upload_submissions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<RunReport>>> {
    let session = get_session(&state, session_id).await?;
    let project = selected_project(&session)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut mode: Option<SubmitMode> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            Some("mode") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                mode = Some(SubmitMode::from_str(text.trim()).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown mode '{}'", text.trim()))
                })?);
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Multipart field 'file' is required".to_string()))?;
    let mode =
        mode.ok_or_else(|| AppError::BadRequest("Multipart field 'mode' is required".to_string()))?;

    let format = SheetFormat::from_file_name(&filename)
        .ok_or_else(|| AppError::Sheet(SheetError::UnsupportedFormat(filename.clone())))?;
    let mut sheet = read_workbook(&bytes, format)?;

    tracing::info!(%session_id, rows = sheet.len(), %mode, file = %filename, "Starting submission run");

    let client = KoboClient::new(session.kobo);

    // Edit mode needs the existing identifiers up front; fetching them is
    // a prerequisite, so a failure here fails the request, not the rows.
    let known = match mode {
        SubmitMode::Edit => {
            let normalized = normalize_identifier_headers(&mut sheet);
            if normalized.created_from_alias {
                tracing::debug!(%session_id, "Created meta/instanceID column from an alias header");
            }
            let submissions = client.list_submissions(&project.uid).await?;
            Some(IdentifierIndex::from_submissions(&submissions))
        }
        SubmitMode::New => None,
    };

    let report = run_rows(&client, &project, &sheet, mode, known.as_ref()).await;

    if !state.sessions.set_report(session_id, report.clone()).await {
        return Err(AppError::NotFound(format!("No workflow session {session_id}")));
    }

    Ok(Json(DataResponse { data: report }))
}

/// The sequential per-row loop. Never returns an error: every row ends
/// up in the report, and a transport failure sets `halted` instead of
/// discarding what already happened.
async fn run_rows(
    client: &KoboClient,
    project: &SelectedProject,
    sheet: &UploadSheet,
    mode: SubmitMode,
    known: Option<&IdentifierIndex>,
) -> RunReport {
    let started_at = chrono::Utc::now();
    let mut report = SubmissionReport::new();
    let mut halted = None;

    for (index, row) in sheet.rows.iter().enumerate() {
        if row.is_empty() {
            report.record(index, RowOutcome::Skipped, "Empty row");
            continue;
        }

        // Edit mode: resolve the row's target. A known identifier makes
        // this an update; an unknown or absent one makes a fresh record
        // (keeping a pre-set identifier when the row carried one).
        let (instance_id, deprecated_id) = match (mode, known) {
            (SubmitMode::Edit, Some(known)) => match match_row(row, known) {
                MatchResult::Existing(id) => (None, Some(id)),
                MatchResult::New { preset_id } => (preset_id, None),
            },
            _ => (None, None),
        };

        let xml = match build_submission_xml(
            row,
            &project.form_id,
            &project.schema,
            instance_id.as_deref(),
            deprecated_id.as_deref(),
        ) {
            Ok(xml) => xml,
            Err(e) => {
                report.record(index, RowOutcome::Failed, e.to_string());
                continue;
            }
        };

        match client.post_submission(xml).await {
            Ok(outcome) => report.record(index, RowOutcome::Success, outcome.reason()),
            Err(e) if e.is_transport() => {
                report.record(index, RowOutcome::Failed, e.to_string());
                halted = Some(format!("Run halted at row {}: {e}", index + 1));
                break;
            }
            Err(e) => report.record(index, RowOutcome::Failed, e.to_string()),
        }
    }

    let summary = report.summary();
    tracing::info!(
        success = summary.success_count,
        failed = summary.failed_count,
        skipped = summary.skipped_count,
        halted = halted.is_some(),
        "Submission run finished"
    );

    RunReport {
        started_at,
        mode,
        summary,
        halted,
    }
}

/// GET /api/v1/sessions/{session_id}/report
///
/// The last run's report as JSON.
pub async fn get_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<RunReport>>> {
    let session = get_session(&state, session_id).await?;
    let report = session
        .last_report
        .ok_or_else(|| AppError::NotFound("No submission run for this session".to_string()))?;

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/sessions/{session_id}/report.csv
///
/// The last run's report as a downloadable CSV.
pub async fn get_report_csv(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = get_session(&state, session_id).await?;
    let report = session
        .last_report
        .ok_or_else(|| AppError::NotFound("No submission run for this session".to_string()))?;

    let headers: [(HeaderName, String); 2] = [
        (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            CONTENT_DISPOSITION,
            "attachment; filename=\"submission_report.csv\"".to_string(),
        ),
    ];
    Ok((headers, report.summary.to_csv()))
}
