//! Data Transfer Objects for API requests and responses.
//!
//! Request and response bodies use camelCase field names and RFC 3339
//! timestamps. Domain models are never serialized directly.

use serde::{Deserialize, Serialize};

use crate::domain::{Project, Task, TaskStatus};
use crate::service::{NewTask, ProjectInput};

// =============================================================================
// Task DTOs
// =============================================================================

/// Request DTO for creating a new task.
///
/// Every field is optional at the JSON level so that missing values reach
/// the service and come back as field-level validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(request: CreateTaskRequest) -> Self {
        Self {
            name: request.name,
            status: request.status,
            start_date: request.start_date,
            due_date: request.due_date,
        }
    }
}

/// Request DTO for renaming a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// New name for the task.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task ID.
    pub id: String,
    pub name: String,
    /// `to-do` or `done`.
    pub status: TaskStatus,
    pub start_date: String,
    pub due_date: String,
    /// Present once the task has been completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_date: Option<String>,
    /// Owning project, if assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.task_id.to_string(),
            name: task.name.clone(),
            status: task.status,
            start_date: task.start_date.to_rfc3339(),
            due_date: task.due_date.to_rfc3339(),
            done_date: task.done_date.map(|done_date| done_date.to_rfc3339()),
            project_id: task.project_id.as_ref().map(ToString::to_string),
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

// =============================================================================
// Project DTOs
// =============================================================================

/// Request DTO for creating or updating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(request: ProjectRequest) -> Self {
        Self {
            name: request.name,
            start_date: request.start_date,
            due_date: request.due_date,
        }
    }
}

/// Response DTO for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    /// Project ID.
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub due_date: String,
    /// IDs of the assigned tasks, in assignment order.
    pub tasks: Vec<String>,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.project_id.to_string(),
            name: project.name.clone(),
            start_date: project.start_date.to_rfc3339(),
            due_date: project.due_date.to_rfc3339(),
            tasks: project.tasks.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self::from(&project)
    }
}

// =============================================================================
// Tests
// =============================================================================
