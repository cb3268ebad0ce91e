pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions                              create session (POST)
/// /sessions/{id}/projects                list projects (GET)
/// /sessions/{id}/project                 select project (POST)
/// /sessions/{id}/template                blank template download (GET)
/// /sessions/{id}/data                    pre-filled data download (GET)
/// /sessions/{id}/export                  platform export download (GET)
/// /sessions/{id}/submissions             upload + run (POST)
/// /sessions/{id}/report                  last run report, JSON (GET)
/// /sessions/{id}/report.csv              last run report, CSV (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::sessions::create_session))
        .route(
            "/sessions/{session_id}/projects",
            get(handlers::sessions::list_projects),
        )
        .route(
            "/sessions/{session_id}/project",
            post(handlers::sessions::select_project),
        )
        .route(
            "/sessions/{session_id}/template",
            get(handlers::templates::download_template),
        )
        .route(
            "/sessions/{session_id}/data",
            get(handlers::templates::download_data),
        )
        .route(
            "/sessions/{session_id}/export",
            get(handlers::templates::download_export),
        )
        .route(
            "/sessions/{session_id}/submissions",
            post(handlers::submissions::upload_submissions),
        )
        .route(
            "/sessions/{session_id}/report",
            get(handlers::submissions::get_report),
        )
        .route(
            "/sessions/{session_id}/report.csv",
            get(handlers::submissions::get_report_csv),
        )
}
