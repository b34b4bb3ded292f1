//! Task handlers.
//!
//! # Routes
//!
//! - `POST /tasks/create`
//! - `GET /tasks/list`
//! - `GET|PATCH|DELETE /tasks/{id}`
//! - `POST /tasks/{id}/done`
//! - `GET /tasks/status/{status}`
//! - `GET /tasks/name/{name}`
//! - `GET /tasks/sort/date/{sortType}`

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::dto::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use super::error::ApiErrorResponse;
use super::handlers::{AppState, parse_task_id};
use crate::domain::Task;

fn to_responses(tasks: Vec<Task>) -> Json<Vec<TaskResponse>> {
    Json(tasks.iter().map(TaskResponse::from).collect())
}

/// Creates a new task.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Write report",
///   "status": "to-do",
///   "startDate": "2023-01-01",
///   "dueDate": "2023-01-05T17:00:00Z"
/// }
/// ```
///
/// Only `name` is required.
///
/// # Response
///
/// - **201 Created**: the stored task
/// - **400 Bad Request**: validation error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on validation or store failure.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let task = state.tasks.create_task(request.into()).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// Lists every task in natural order.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on store failure.
pub async fn get_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    Ok(to_responses(state.tasks.get_tasks().await?))
}

/// Fetches one task.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed or unknown id.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task_id = parse_task_id("id", &id)?;
    let task = state.tasks.get_task(&task_id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Renames a task.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an unknown id (404) or a blank name (400).
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task_id = parse_task_id("id", &id)?;
    let task = state
        .tasks
        .update_task(&task_id, request.name.as_deref())
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Deletes a task.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed or unknown id.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    let task_id = parse_task_id("id", &id)?;
    state.tasks.delete_task(&task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggles a task between `done` and `to-do`.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed or unknown id.
pub async fn toggle_task_completion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    let task_id = parse_task_id("id", &id)?;
    state.tasks.toggle_task_completion(&task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists tasks whose status matches the pattern.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an invalid pattern.
pub async fn get_tasks_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    Ok(to_responses(state.tasks.get_tasks_by_status(&status).await?))
}

/// Lists tasks whose name matches the pattern.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an invalid pattern.
pub async fn get_tasks_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    Ok(to_responses(state.tasks.get_tasks_by_name(&name).await?))
}

/// Lists tasks sorted ascending by a date field.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an unknown field name.
pub async fn get_tasks_by_sort_date(
    State(state): State<AppState>,
    Path(sort_type): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    Ok(to_responses(
        state.tasks.get_tasks_by_sort_date(&sort_type).await?,
    ))
}
