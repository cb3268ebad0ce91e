//! Session creation and project selection (workflow steps one and two).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use kobopush_core::flatten::flatten_survey;
use kobopush_core::schema::parse_survey;
use kobopush_kobo::{AssetSummary, KoboClient, KoboSession, ServerChoice};

use crate::error::{AppError, AppResult};
use crate::handlers::get_session;
use crate::response::DataResponse;
use crate::state::{AppState, SelectedProject};

/// Request body for session creation.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Platform instance to talk to.
    pub server: ServerChoice,
    /// Private API token.
    pub token: String,
}

/// Typed response for session creation.
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    /// Survey projects visible to the token, listed up front so the
    /// client can render step two immediately.
    pub projects: Vec<AssetSummary>,
}

/// POST /api/v1/sessions
///
/// Validate credentials by listing the token's survey projects. An
/// invalid token fails here with 401, before any session is stored.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionCreated>>)> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("API token must not be empty".to_string()));
    }

    let kobo = KoboSession::new(&request.server, token);
    let client = KoboClient::new(kobo.clone());
    let projects = client.list_assets().await?;

    let session_id = state.sessions.create(kobo).await;
    tracing::info!(%session_id, projects = projects.len(), "Workflow session created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionCreated {
                session_id,
                projects,
            },
        }),
    ))
}

/// GET /api/v1/sessions/{session_id}/projects
///
/// Relist the session's survey projects.
pub async fn list_projects(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Vec<AssetSummary>>>> {
    let session = get_session(&state, session_id).await?;
    let client = KoboClient::new(session.kobo);
    let projects = client.list_assets().await?;

    Ok(Json(DataResponse { data: projects }))
}

/// Request body for project selection.
#[derive(Debug, Deserialize)]
pub struct SelectProjectRequest {
    pub uid: String,
}

/// Typed response for project selection.
#[derive(Debug, Serialize)]
pub struct ProjectSelected {
    pub uid: String,
    pub name: String,
    pub form_id: String,
    /// Template columns in order, geopoints expanded.
    pub columns: Vec<String>,
    /// Flattening warnings (skipped repeat groups, duplicate names).
    pub warnings: Vec<String>,
}

/// POST /api/v1/sessions/{session_id}/project
///
/// Fetch the asset detail, resolve its form id, flatten the schema, and
/// remember everything on the session.
pub async fn select_project(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectProjectRequest>,
) -> AppResult<Json<DataResponse<ProjectSelected>>> {
    let session = get_session(&state, session_id).await?;
    let client = KoboClient::new(session.kobo);

    let asset = client.get_asset(&request.uid).await?;
    let form_id = client.resolve_form_id(&asset).await?.ok_or_else(|| {
        AppError::BadRequest("Could not determine a form id for this project".to_string())
    })?;

    let survey = parse_survey(&asset)?;
    let schema = flatten_survey(&survey);
    let columns = schema.template_columns();
    let name = asset
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("(untitled)")
        .to_string();

    for warning in &schema.warnings {
        tracing::warn!(%session_id, uid = %request.uid, warning, "Schema flattening warning");
    }

    let project = SelectedProject {
        uid: request.uid.clone(),
        name: name.clone(),
        form_id: form_id.clone(),
        schema: schema.clone(),
        columns: columns.clone(),
    };
    if !state.sessions.set_project(session_id, project).await {
        return Err(AppError::NotFound(format!("No workflow session {session_id}")));
    }

    tracing::info!(%session_id, uid = %request.uid, form_id, "Project selected");

    Ok(Json(DataResponse {
        data: ProjectSelected {
            uid: request.uid,
            name,
            form_id,
            columns,
            warnings: schema.warnings,
        },
    }))
}
