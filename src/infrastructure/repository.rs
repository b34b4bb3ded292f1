//! Repository traits for domain entities.
//!
//! Every method returns a boxed `Send` future so that services can hold
//! repositories behind `Arc<dyn ...>` and await them from axum handlers.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{
    DueWindow, Pattern, Project, ProjectId, ProjectSortField, Task, TaskId, TaskSortField,
};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Database connection error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Future returned by every repository method.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Filters
// =============================================================================

/// Selection criteria for task queries.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    /// Every task.
    All,
    /// Tasks whose status text matches the pattern.
    StatusMatches(Pattern),
    /// Tasks whose name matches the pattern.
    NameMatches(Pattern),
    /// Tasks assigned to any of the given projects.
    InProjects(Vec<ProjectId>),
    /// Tasks whose due date lies in the window.
    DueWithin(DueWindow),
}

impl TaskFilter {
    /// Evaluates the filter against a single task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::StatusMatches(pattern) => pattern.is_match(task.status.as_str()),
            Self::NameMatches(pattern) => pattern.is_match(&task.name),
            Self::InProjects(project_ids) => task
                .project_id
                .as_ref()
                .is_some_and(|project_id| project_ids.contains(project_id)),
            Self::DueWithin(window) => window.contains(&task.due_date),
        }
    }
}

/// Selection criteria for project queries.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectFilter {
    /// Every project.
    All,
    /// Projects whose name matches the pattern.
    NameMatches(Pattern),
    /// Projects listing at least one of the given tasks.
    ContainsAnyTask(Vec<TaskId>),
    /// Projects whose due date lies in the window.
    DueWithin(DueWindow),
}

impl ProjectFilter {
    /// Evaluates the filter against a single project.
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        match self {
            Self::All => true,
            Self::NameMatches(pattern) => pattern.is_match(&project.name),
            Self::ContainsAnyTask(task_ids) => {
                project.tasks.iter().any(|task_id| task_ids.contains(task_id))
            }
            Self::DueWithin(window) => window.contains(&project.due_date),
        }
    }
}

// =============================================================================
// Task Repository
// =============================================================================

/// Repository trait for Task entities.
///
/// Results come back in natural order (the order in which records were
/// inserted) unless a sort field is requested.
pub trait TaskRepository: Send + Sync {
    /// Finds a task by its ID.
    ///
    /// Returns `Ok(Some(task))` if found, `Ok(None)` if not found,
    /// or an error if the operation fails.
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>>;

    /// Inserts a new task.
    fn insert(&self, task: &Task) -> RepositoryFuture<()>;

    /// Inserts several tasks, keeping their relative order.
    fn insert_many(&self, tasks: &[Task]) -> RepositoryFuture<()>;

    /// Replaces a stored task with the given value.
    ///
    /// Returns `RepositoryError::NotFound` if no task has the same ID.
    fn replace(&self, task: &Task) -> RepositoryFuture<()>;

    /// Sets (or clears) the project reference of a single task.
    ///
    /// Returns `Ok(false)` if the task does not exist.
    fn set_project(&self, id: &TaskId, project_id: Option<ProjectId>) -> RepositoryFuture<bool>;

    /// Clears the project reference of every task pointing at `project_id`.
    ///
    /// Returns the number of tasks updated.
    fn clear_project(&self, project_id: &ProjectId) -> RepositoryFuture<u64>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool>;

    /// Returns the tasks selected by `filter`.
    ///
    /// With a sort field, results are ascending by that field, ties keep
    /// natural order, and tasks without a value for the field are left out.
    fn find(&self, filter: TaskFilter, sort: Option<TaskSortField>)
    -> RepositoryFuture<Vec<Task>>;
}

// =============================================================================
// Project Repository
// =============================================================================

/// Repository trait for Project entities.
pub trait ProjectRepository: Send + Sync {
    /// Finds a project by its ID.
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>>;

    /// Inserts a new project.
    fn insert(&self, project: &Project) -> RepositoryFuture<()>;

    /// Writes the name and dates of `project`. The stored `tasks` list is
    /// left as is; only `push_task` and `pull_task` change it.
    ///
    /// Returns `Ok(false)` if the project does not exist.
    fn update_details(&self, project: &Project) -> RepositoryFuture<bool>;

    /// Deletes a project by its ID.
    fn delete(&self, id: &ProjectId) -> RepositoryFuture<bool>;

    /// Returns the projects selected by `filter`, optionally sorted
    /// ascending with ties in natural order.
    fn find(
        &self,
        filter: ProjectFilter,
        sort: Option<ProjectSortField>,
    ) -> RepositoryFuture<Vec<Project>>;

    /// Appends a task id to the project's `tasks` unless already present.
    ///
    /// Returns `Ok(false)` if the project does not exist.
    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<bool>;

    /// Removes a task id from the project's `tasks`.
    ///
    /// Returns `Ok(false)` if the project does not exist.
    fn pull_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<bool>;
}

// =============================================================================
// Tests
// =============================================================================
