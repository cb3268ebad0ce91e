//! HTTP handlers for the five-step upload workflow.

pub mod sessions;
pub mod submissions;
pub mod templates;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::{AppState, SelectedProject, WorkflowSession};

/// Fetch a workflow session or fail with 404.
pub(crate) async fn get_session(state: &AppState, id: Uuid) -> AppResult<WorkflowSession> {
    state
        .sessions
        .snapshot(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No workflow session {id}")))
}

/// The session's selected project, or 400 when step two has not happened.
pub(crate) fn selected_project(session: &WorkflowSession) -> AppResult<SelectedProject> {
    session
        .project
        .clone()
        .ok_or_else(|| AppError::BadRequest("No project selected for this session".to_string()))
}
