//! Shared handler state and utility endpoints.

use std::sync::Arc;

use axum::Json;

use super::error::ApiErrorResponse;
use crate::domain::{ProjectId, TaskId};
use crate::infrastructure::{Clock, Repositories};
use crate::service::{DueItemService, ProjectService, TaskService, ValidationError};

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Built once at startup and cloned into every handler by axum. Services
/// only hold `Arc`s, so cloning is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Task operations.
    pub tasks: TaskService,
    /// Project operations, including assignment.
    pub projects: ProjectService,
    /// Due-item queries.
    pub due: DueItemService,
}

impl AppState {
    /// Wires the three services onto one set of repositories and a clock.
    #[must_use]
    pub fn new(repositories: &Repositories, clock: Arc<dyn Clock>) -> Self {
        let task_repository = Arc::clone(&repositories.task_repository);
        let project_repository = Arc::clone(&repositories.project_repository);

        let tasks = TaskService::new(
            Arc::clone(&task_repository),
            Arc::clone(&project_repository),
            Arc::clone(&clock),
        );
        let projects = ProjectService::new(
            Arc::clone(&project_repository),
            Arc::clone(&task_repository),
            tasks.clone(),
            Arc::clone(&clock),
        );
        let due = DueItemService::new(task_repository, project_repository, clock);

        Self {
            tasks,
            projects,
            due,
        }
    }
}

// =============================================================================
// Path Parameters
// =============================================================================

/// Parses a task id taken from the URL path.
///
/// # Errors
///
/// Returns a 400 validation response when `raw` is not a UUID.
pub fn parse_task_id(field: &str, raw: &str) -> Result<TaskId, ApiErrorResponse> {
    raw.parse().map_err(|_| {
        ValidationError::single(field, format!("Invalid task id: '{raw}'")).into()
    })
}

/// Parses a project id taken from the URL path.
///
/// # Errors
///
/// Returns a 400 validation response when `raw` is not a UUID.
pub fn parse_project_id(field: &str, raw: &str) -> Result<ProjectId, ApiErrorResponse> {
    raw.parse().map_err(|_| {
        ValidationError::single(field, format!("Invalid project id: '{raw}'")).into()
    })
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
