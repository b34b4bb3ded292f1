//! Project domain model.
//!
//! A project groups tasks. Membership is recorded as an ordered list of
//! task ids in which each id appears at most once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{InvalidSortField, TaskId, Timestamp};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a project.
///
/// This is a newtype wrapper around UUID to provide type safety.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Creates a `ProjectId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new `ProjectId` with a randomly generated UUID (v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Generates a new `ProjectId` with a time-ordered UUID (v7).
    #[must_use]
    pub fn generate_v7() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Date fields a project list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectSortField {
    /// Sort by `start_date`.
    StartDate,
    /// Sort by `due_date`.
    DueDate,
}

impl ProjectSortField {
    /// Returns the value a project is ordered by.
    #[must_use]
    pub const fn key(self, project: &Project) -> Timestamp {
        match self {
            Self::StartDate => project.start_date,
            Self::DueDate => project.due_date,
        }
    }
}

impl std::str::FromStr for ProjectSortField {
    type Err = InvalidSortField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "startDate" => Ok(Self::StartDate),
            "dueDate" => Ok(Self::DueDate),
            other => Err(InvalidSortField(other.to_string())),
        }
    }
}

// =============================================================================
// Project
// =============================================================================

/// The project domain model.
///
/// # Examples
///
/// ```
/// use todo_list_api::domain::{Project, ProjectId, TaskId, Timestamp};
///
/// let task_id = TaskId::generate();
/// let project = Project::new(ProjectId::generate(), "Home", Timestamp::now())
///     .attach_task(task_id.clone())
///     .attach_task(task_id.clone());
/// assert_eq!(project.tasks, vec![task_id]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project.
    pub project_id: ProjectId,
    /// Name of the project.
    pub name: String,
    /// When the project starts.
    pub start_date: Timestamp,
    /// When the project is due.
    pub due_date: Timestamp,
    /// Ids of the tasks assigned to this project, in assignment order.
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

impl Project {
    /// Creates a new project without tasks whose start and due dates are
    /// `timestamp`.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            project_id,
            name: name.into(),
            start_date: timestamp,
            due_date: timestamp,
            tasks: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Builder-style methods (pure immutable updates)
    // -------------------------------------------------------------------------

    /// Returns a new project with the given name.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Returns a new project with the given start date.
    #[must_use]
    pub fn with_start_date(self, start_date: Timestamp) -> Self {
        Self { start_date, ..self }
    }

    /// Returns a new project with the given due date.
    #[must_use]
    pub fn with_due_date(self, due_date: Timestamp) -> Self {
        Self { due_date, ..self }
    }

    // -------------------------------------------------------------------------
    // Task membership (pure)
    // -------------------------------------------------------------------------

    /// Returns `true` if the task is listed in this project.
    #[must_use]
    pub fn has_task(&self, task_id: &TaskId) -> bool {
        self.tasks.contains(task_id)
    }

    /// Returns a new project with the task appended.
    ///
    /// If the task is already listed, the project is returned unchanged.
    #[must_use]
    pub fn attach_task(mut self, task_id: TaskId) -> Self {
        if !self.has_task(&task_id) {
            self.tasks.push(task_id);
        }
        self
    }

    /// Returns a new project with the task removed, keeping the order of the
    /// remaining tasks.
    #[must_use]
    pub fn detach_task(mut self, task_id: &TaskId) -> Self {
        self.tasks.retain(|listed| listed != task_id);
        self
    }

    /// Returns the number of assigned tasks.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
