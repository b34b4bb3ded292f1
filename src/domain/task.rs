//! Task domain model.
//!
//! This module contains the core entity of the to-do list together with
//! the value objects it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectId;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// This is a newtype wrapper around UUID to provide type safety.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from an existing UUID.
    ///
    /// This is a pure function - it does not generate a new UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new `TaskId` with a randomly generated UUID (v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Generates a new `TaskId` with a time-ordered UUID (v7).
    ///
    /// Store-assigned identifiers use this variant so that ids sort in
    /// creation order.
    #[must_use]
    pub fn generate_v7() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
///
/// This provides a consistent timestamp type throughout the domain model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This reads the system clock. Services obtain "now" through
    /// the injected `Clock` instead of calling this directly.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Formats the timestamp as RFC 3339 with millisecond precision.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

// =============================================================================
// Enums
// =============================================================================

/// The status of a task.
///
/// Serialized as `"to-do"` and `"done"`, which is also the text that
/// status pattern queries match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    /// Task still has to be done.
    #[default]
    #[serde(rename = "to-do")]
    ToDo,
    /// Task has been completed.
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to-do",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a status string is neither `to-do` nor `done`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid task status: '{0}'. Expected 'to-do' or 'done'")]
pub struct InvalidTaskStatus(pub String);

impl std::str::FromStr for TaskStatus {
    type Err = InvalidTaskStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "to-do" => Ok(Self::ToDo),
            "done" => Ok(Self::Done),
            other => Err(InvalidTaskStatus(other.to_string())),
        }
    }
}

/// Date fields a task list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSortField {
    /// Sort by `start_date`.
    StartDate,
    /// Sort by `due_date`.
    DueDate,
    /// Sort by `done_date`; tasks that were never completed are excluded.
    DoneDate,
}

impl TaskSortField {
    /// Returns the value a task is ordered by, or `None` when the task has
    /// no value for this field.
    #[must_use]
    pub const fn key(self, task: &Task) -> Option<Timestamp> {
        match self {
            Self::StartDate => Some(task.start_date),
            Self::DueDate => Some(task.due_date),
            Self::DoneDate => task.done_date,
        }
    }
}

/// Error returned for an unknown sort field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid sort field: '{0}'")]
pub struct InvalidSortField(pub String);

impl std::str::FromStr for TaskSortField {
    type Err = InvalidSortField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "startDate" => Ok(Self::StartDate),
            "dueDate" => Ok(Self::DueDate),
            "doneDate" => Ok(Self::DoneDate),
            other => Err(InvalidSortField(other.to_string())),
        }
    }
}

// =============================================================================
// Task
// =============================================================================

/// The main task domain model.
///
/// A task optionally belongs to one project through `project_id`. The
/// reverse side of that relationship lives in `Project::tasks` and both are
/// kept consistent by the project service.
///
/// # Examples
///
/// ```
/// use todo_list_api::domain::{Task, TaskId, TaskStatus, Timestamp};
///
/// let now = Timestamp::now();
/// let task = Task::new(TaskId::generate(), "Write report", now).mark_done(now);
/// assert_eq!(task.status, TaskStatus::Done);
/// assert_eq!(task.done_date, Some(now));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task.
    pub task_id: TaskId,
    /// Name of the task.
    pub name: String,
    /// Current status of the task.
    pub status: TaskStatus,
    /// When work on the task starts.
    pub start_date: Timestamp,
    /// When the task is due.
    pub due_date: Timestamp,
    /// When the task was completed. Absent unless the status is `Done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_date: Option<Timestamp>,
    /// The project this task is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

impl Task {
    /// Creates a new to-do task whose start and due dates are `timestamp`.
    ///
    /// This is a pure function; the caller supplies the id and the clock
    /// reading.
    #[must_use]
    pub fn new(task_id: TaskId, name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            task_id,
            name: name.into(),
            status: TaskStatus::ToDo,
            start_date: timestamp,
            due_date: timestamp,
            done_date: None,
            project_id: None,
        }
    }

    // -------------------------------------------------------------------------
    // Builder-style methods (pure immutable updates)
    // -------------------------------------------------------------------------

    /// Returns a new task with the given name.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Returns a new task with the given start date.
    #[must_use]
    pub fn with_start_date(self, start_date: Timestamp) -> Self {
        Self { start_date, ..self }
    }

    /// Returns a new task with the given due date.
    #[must_use]
    pub fn with_due_date(self, due_date: Timestamp) -> Self {
        Self { due_date, ..self }
    }

    /// Returns a new task assigned to the given project (or unassigned).
    #[must_use]
    pub fn with_project(self, project_id: Option<ProjectId>) -> Self {
        Self { project_id, ..self }
    }

    // -------------------------------------------------------------------------
    // Completion
    // -------------------------------------------------------------------------

    /// Returns a new task marked as done at `now`. The start date is kept.
    #[must_use]
    pub fn mark_done(self, now: Timestamp) -> Self {
        Self {
            status: TaskStatus::Done,
            done_date: Some(now),
            ..self
        }
    }

    /// Returns a new task moved back to to-do, restarting at `now`.
    #[must_use]
    pub fn reopen(self, now: Timestamp) -> Self {
        Self {
            status: TaskStatus::ToDo,
            done_date: None,
            start_date: now,
            ..self
        }
    }

    /// Flips the task between done and to-do.
    #[must_use]
    pub fn toggle_completion(self, now: Timestamp) -> Self {
        match self.status {
            TaskStatus::Done => self.reopen(now),
            TaskStatus::ToDo => self.mark_done(now),
        }
    }

    /// Returns `true` if the task has been completed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.status, TaskStatus::Done)
    }
}

// =============================================================================
// Tests
// =============================================================================
