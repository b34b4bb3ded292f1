//! Due-item handlers.

use axum::{Json, extract::State};

use super::dto::{ProjectResponse, TaskResponse};
use super::error::ApiErrorResponse;
use super::handlers::AppState;

/// `GET /bonus/due/projects`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on store failure.
pub async fn get_all_projects_with_due_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiErrorResponse> {
    let projects = state.due.get_all_projects_with_due_tasks().await?;
    Ok(Json(projects.iter().map(ProjectResponse::from).collect()))
}

/// `GET /bonus/due/tasks`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on store failure.
pub async fn get_all_tasks_with_due_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.due.get_all_tasks_with_due_projects().await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}
