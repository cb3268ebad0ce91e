//! Shared application state: configuration plus the in-memory workflow
//! session store.
//!
//! Sessions hold everything the five-step workflow accumulates —
//! credentials, the selected project with its flattened schema, and the
//! last run's report. They live only as long as the process (no
//! persistence by design).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use kobopush_core::flatten::FlatSchema;
use kobopush_core::report::ReportSummary;
use kobopush_kobo::KoboSession;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Workflow session store.
    pub sessions: Arc<SessionStore>,
}

/// Upload mode chosen in step three of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Upload rows as brand-new submissions.
    New,
    /// Edit existing submissions, matched by identifier.
    Edit,
}

impl SubmitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Edit => "edit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The project chosen in step two, with everything derived from its form.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedProject {
    pub uid: String,
    pub name: String,
    /// Form id used for submission documents.
    pub form_id: String,
    /// Flattened form schema.
    pub schema: FlatSchema,
    /// Template columns (schema columns plus identifier columns).
    pub columns: Vec<String>,
}

/// Result of one submission run, kept for report retrieval.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub mode: SubmitMode,
    pub summary: ReportSummary,
    /// Set when a transport failure interrupted the run; the summary
    /// still holds one outcome per attempted row.
    pub halted: Option<String>,
}

/// One workflow session.
#[derive(Debug, Clone)]
pub struct WorkflowSession {
    /// Platform credentials and server selection.
    pub kobo: KoboSession,
    /// Selected project, once step two completed.
    pub project: Option<SelectedProject>,
    /// Report of the most recent submission run.
    pub last_report: Option<RunReport>,
}

/// In-memory session store keyed by session id.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, WorkflowSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for freshly validated credentials.
    pub async fn create(&self, kobo: KoboSession) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.insert(
            id,
            WorkflowSession {
                kobo,
                project: None,
                last_report: None,
            },
        );
        id
    }

    /// Clone the session, if it exists.
    pub async fn snapshot(&self, id: Uuid) -> Option<WorkflowSession> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Select a project. Clears any previous run report, mirroring the
    /// upload-state reset when the user switches projects.
    /// Returns `false` when the session does not exist.
    pub async fn set_project(&self, id: Uuid, project: SelectedProject) -> bool {
        match self.inner.write().await.get_mut(&id) {
            Some(session) => {
                session.project = Some(project);
                session.last_report = None;
                true
            }
            None => false,
        }
    }

    /// Store the report of a finished run.
    /// Returns `false` when the session does not exist.
    pub async fn set_report(&self, id: Uuid, report: RunReport) -> bool {
        match self.inner.write().await.get_mut(&id) {
            Some(session) => {
                session.last_report = Some(report);
                true
            }
            None => false,
        }
    }
}
