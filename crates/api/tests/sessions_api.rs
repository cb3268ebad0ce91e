//! Integration tests for workflow session endpoints that do not require
//! a reachable platform (error paths and request validation).

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};

// ---------------------------------------------------------------------------
// Test: endpoints under an unknown session return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_session_returns_404() {
    for path in [
        "projects",
        "template",
        "data",
        "export",
        "report",
        "report.csv",
    ] {
        let app = common::build_test_app();
        let uri = format!("/api/v1/sessions/0c7b1f70-2f2d-4c3e-9a56-1b6f9e3f0d11/{path}");
        let response = get(app, &uri).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path: {path}");

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND", "path: {path}");
    }
}

// ---------------------------------------------------------------------------
// Test: a malformed session id in the path is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_session_id_returns_400() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/sessions/not-a-uuid/report").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: session creation rejects a blank token before touching the platform
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_token_returns_400() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/sessions",
        r#"{"server": {"kind": "global"}, "token": "   "}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: syntactically invalid JSON is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_json_body_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(app, "/api/v1/sessions", "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
