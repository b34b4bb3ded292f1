//! Project handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::dto::{ProjectRequest, ProjectResponse, TaskResponse};
use super::error::ApiErrorResponse;
use super::handlers::{AppState, parse_project_id, parse_task_id};
use crate::domain::Project;

fn to_responses(projects: Vec<Project>) -> Json<Vec<ProjectResponse>> {
    Json(projects.iter().map(ProjectResponse::from).collect())
}

/// Creates a new project.
///
/// # Response
///
/// - **201 Created**: the stored project, with an empty `tasks` list
/// - **400 Bad Request**: validation error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on validation or store failure.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiErrorResponse> {
    let project = state.projects.create_project(request.into()).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// Lists every project in natural order.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on store failure.
pub async fn get_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiErrorResponse> {
    Ok(to_responses(state.projects.get_projects().await?))
}

/// Fetches one project.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed or unknown id.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiErrorResponse> {
    let project_id = parse_project_id("id", &id)?;
    let project = state.projects.get_project(&project_id).await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// Replaces a project's name and dates.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an unknown id (404) or invalid input (400).
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiErrorResponse> {
    let project_id = parse_project_id("id", &id)?;
    let project = state
        .projects
        .update_project(&project_id, request.into())
        .await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// Deletes a project; its tasks are kept but unassigned.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed or unknown id.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    let project_id = parse_project_id("id", &id)?;
    state.projects.delete_project(&project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assigns a task to a project.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for malformed ids (400) or when either side
/// does not exist (404).
pub async fn assign_task_to_project(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiErrorResponse> {
    let project_id = parse_project_id("projectId", &project_id)?;
    let task_id = parse_task_id("taskId", &task_id)?;
    state
        .projects
        .assign_task_to_project(&project_id, &task_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the tasks of projects whose name matches the pattern.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an invalid pattern.
pub async fn get_tasks_by_project_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.projects.get_tasks_by_project_name(&name).await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}

/// Lists projects sorted ascending by a date field.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an unknown field name.
pub async fn get_projects_by_sort_date(
    State(state): State<AppState>,
    Path(sort_type): Path<String>,
) -> Result<Json<Vec<ProjectResponse>>, ApiErrorResponse> {
    Ok(to_responses(
        state.projects.get_projects_by_sort_date(&sort_type).await?,
    ))
}
