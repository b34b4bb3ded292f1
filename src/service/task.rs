//! Task service: CRUD and query operations over tasks.

use std::sync::Arc;

use crate::domain::{Task, TaskId, TaskStatus};
use crate::infrastructure::{Clock, ProjectRepository, TaskFilter, TaskRepository};

use super::error::ServiceError;
use super::validation::{
    parse_pattern, parse_required_pattern, parse_status, parse_task_sort_field, resolve_dates,
    validate_name,
};

// =============================================================================
// Inputs
// =============================================================================

/// Unvalidated input for [`TaskService::create_task`].
///
/// Fields carry what the client sent; the service validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Required; surrounding whitespace is trimmed.
    pub name: Option<String>,
    /// `to-do` or `done`; defaults to `to-do`.
    pub status: Option<String>,
    /// Defaults to now.
    pub start_date: Option<String>,
    /// Defaults to now.
    pub due_date: Option<String>,
}

impl NewTask {
    /// Creates an input with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(self, status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_start_date(self, start_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_due_date(self, due_date: impl Into<String>) -> Self {
        Self {
            due_date: Some(due_date.into()),
            ..self
        }
    }
}

// =============================================================================
// Task Service
// =============================================================================

/// Operations on tasks.
///
/// Holds the project repository only to keep a project's task list in sync
/// when one of its tasks is deleted.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("TaskService").finish_non_exhaustive()
    }
}

impl TaskService {
    /// Creates a service over the given repositories and clock.
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            projects,
            clock,
        }
    }

    /// Validates and stores a new task.
    ///
    /// A task created as `done` is stamped with the current time as its
    /// completion date.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a blank name, unknown status,
    ///   unparseable date, or a start date after the due date
    /// - `ServiceError::Repository` if the store fails
    pub async fn create_task(&self, input: NewTask) -> Result<Task, ServiceError> {
        let name = validate_name("name", input.name.as_deref())?;
        let status = parse_status(input.status.as_deref())?;
        let now = self.clock.timestamp();
        let (start_date, due_date) =
            resolve_dates(input.start_date.as_deref(), input.due_date.as_deref(), now)?;

        let task = Task::new(TaskId::generate_v7(), name, now)
            .with_start_date(start_date)
            .with_due_date(due_date);
        let task = match status {
            TaskStatus::Done => task.mark_done(now),
            TaskStatus::ToDo => task,
        };

        self.tasks.insert(&task).await?;
        tracing::info!(task_id = %task.task_id, status = %task.status, "Task created");
        Ok(task)
    }

    /// Returns every task in natural order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.tasks.find(TaskFilter::All, None).await?)
    }

    /// Returns a single task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no task has this id.
    pub async fn get_task(&self, task_id: &TaskId) -> Result<Task, ServiceError> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ServiceError::task_not_found(task_id))
    }

    /// Renames a task. Existence is checked before the name is validated.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if no task has this id
    /// - `ServiceError::Validation` for a blank name
    pub async fn update_task(
        &self,
        task_id: &TaskId,
        name: Option<&str>,
    ) -> Result<Task, ServiceError> {
        let task = self.get_task(task_id).await?;
        let name = validate_name("name", name)?;

        let updated = task.with_name(name);
        self.tasks.replace(&updated).await?;
        tracing::debug!(task_id = %task_id, "Task renamed");
        Ok(updated)
    }

    /// Deletes a task and removes it from its project's task list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no task has this id.
    pub async fn delete_task(&self, task_id: &TaskId) -> Result<(), ServiceError> {
        let task = self.get_task(task_id).await?;

        if !self.tasks.delete(task_id).await? {
            return Err(ServiceError::task_not_found(task_id));
        }
        if let Some(project_id) = &task.project_id {
            self.projects.pull_task(project_id, task_id).await?;
        }

        tracing::info!(task_id = %task_id, project_id = ?task.project_id, "Task deleted");
        Ok(())
    }

    /// Flips a task between `done` and `to-do`.
    ///
    /// Completing sets the done date to now. Reopening clears it and moves
    /// the start date to now.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no task has this id.
    pub async fn toggle_task_completion(&self, task_id: &TaskId) -> Result<Task, ServiceError> {
        let task = self.get_task(task_id).await?;

        let toggled = task.toggle_completion(self.clock.timestamp());
        self.tasks.replace(&toggled).await?;
        tracing::info!(task_id = %task_id, status = %toggled.status, "Task completion toggled");
        Ok(toggled)
    }

    /// Returns tasks whose status text matches `status` as a pattern.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an invalid pattern.
    pub async fn get_tasks_by_status(&self, status: &str) -> Result<Vec<Task>, ServiceError> {
        let pattern = parse_pattern("status", status)?;
        Ok(self
            .tasks
            .find(TaskFilter::StatusMatches(pattern), None)
            .await?)
    }

    /// Returns tasks whose name matches `name` as a pattern.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty or invalid pattern.
    pub async fn get_tasks_by_name(&self, name: &str) -> Result<Vec<Task>, ServiceError> {
        let pattern = parse_required_pattern("name", name)?;
        Ok(self.tasks.find(TaskFilter::NameMatches(pattern), None).await?)
    }

    /// Returns tasks sorted ascending by `startDate`, `dueDate` or `doneDate`.
    ///
    /// Sorting by `doneDate` leaves out tasks that were never completed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for any other field name.
    pub async fn get_tasks_by_sort_date(&self, field: &str) -> Result<Vec<Task>, ServiceError> {
        let field = parse_task_sort_field(field)?;
        Ok(self.tasks.find(TaskFilter::All, Some(field)).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
