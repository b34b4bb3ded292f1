//! Project service: CRUD over projects, task assignment, and
//! project-scoped task queries.

use std::sync::Arc;

use crate::domain::{Project, ProjectId, Task, TaskId};
use crate::infrastructure::{Clock, ProjectFilter, ProjectRepository, TaskFilter, TaskRepository};

use super::error::ServiceError;
use super::task::TaskService;
use super::validation::{
    parse_project_sort_field, parse_required_pattern, resolve_dates, validate_name,
};

/// Unvalidated input for creating or updating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInput {
    /// Required; surrounding whitespace is trimmed.
    pub name: Option<String>,
    /// Defaults to now.
    pub start_date: Option<String>,
    /// Defaults to now.
    pub due_date: Option<String>,
}

impl ProjectInput {
    /// Creates an input with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
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

/// Operations on projects.
///
/// Task existence checks go through [`TaskService`]; the task repository is
/// used directly only for the `project_id` back-reference and for
/// project-scoped queries.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    task_service: TaskService,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ProjectService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("ProjectService").finish_non_exhaustive()
    }
}

impl ProjectService {
    /// Creates a service; `task_service` must share `tasks` as its repository.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        task_service: TaskService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            tasks,
            task_service,
            clock,
        }
    }

    /// Validates and stores a new project with no tasks.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a blank name, an unparseable date,
    ///   or a start date after the due date
    /// - `ServiceError::Repository` if the store fails
    pub async fn create_project(&self, input: ProjectInput) -> Result<Project, ServiceError> {
        let name = validate_name("name", input.name.as_deref())?;
        let now = self.clock.timestamp();
        let (start_date, due_date) =
            resolve_dates(input.start_date.as_deref(), input.due_date.as_deref(), now)?;

        let project = Project::new(ProjectId::generate_v7(), name, now)
            .with_start_date(start_date)
            .with_due_date(due_date);

        self.projects.insert(&project).await?;
        tracing::info!(project_id = %project.project_id, "Project created");
        Ok(project)
    }

    /// Returns every project in natural order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_projects(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.projects.find(ProjectFilter::All, None).await?)
    }

    /// Returns a single project.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no project has this id.
    pub async fn get_project(&self, project_id: &ProjectId) -> Result<Project, ServiceError> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ServiceError::project_not_found(project_id))
    }

    /// Replaces a project's name and dates, keeping its task list.
    ///
    /// Omitted dates fall back to now, as on creation.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if no project has this id
    /// - `ServiceError::Validation` as for [`Self::create_project`]
    pub async fn update_project(
        &self,
        project_id: &ProjectId,
        input: ProjectInput,
    ) -> Result<Project, ServiceError> {
        let project = self.get_project(project_id).await?;
        let name = validate_name("name", input.name.as_deref())?;
        let (start_date, due_date) = resolve_dates(
            input.start_date.as_deref(),
            input.due_date.as_deref(),
            self.clock.timestamp(),
        )?;

        let details = project
            .with_name(name)
            .with_start_date(start_date)
            .with_due_date(due_date);
        if !self.projects.update_details(&details).await? {
            return Err(ServiceError::project_not_found(project_id));
        }
        tracing::debug!(project_id = %project_id, "Project updated");

        // Re-read so the response carries the current task list
        self.get_project(project_id).await
    }

    /// Deletes a project after clearing the back-reference on its tasks.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no project has this id.
    pub async fn delete_project(&self, project_id: &ProjectId) -> Result<(), ServiceError> {
        self.get_project(project_id).await?;

        let detached = self.tasks.clear_project(project_id).await?;
        if !self.projects.delete(project_id).await? {
            return Err(ServiceError::project_not_found(project_id));
        }

        tracing::info!(project_id = %project_id, detached, "Project deleted");
        Ok(())
    }

    /// Assigns a task to a project, moving it out of any other project.
    ///
    /// Assigning a task to the project that already lists it changes
    /// nothing. The writes are not transactional: a failure part way
    /// through is reported and leaves the earlier writes in place.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the project or the task does not exist
    /// - `ServiceError::Repository` if a write fails
    pub async fn assign_task_to_project(
        &self,
        project_id: &ProjectId,
        task_id: &TaskId,
    ) -> Result<(), ServiceError> {
        self.get_project(project_id).await?;
        self.task_service.get_task(task_id).await?;

        let owners = self
            .projects
            .find(ProjectFilter::ContainsAnyTask(vec![task_id.clone()]), None)
            .await?;

        if owners.iter().any(|owner| &owner.project_id == project_id) {
            tracing::debug!(%project_id, %task_id, "Task already assigned to project");
            return Ok(());
        }

        for previous in &owners {
            self.projects.pull_task(&previous.project_id, task_id).await?;
            tracing::debug!(
                from_project_id = %previous.project_id,
                %task_id,
                "Task detached from previous project"
            );
        }

        if !self.projects.push_task(project_id, task_id).await? {
            return Err(ServiceError::project_not_found(project_id));
        }
        if !self
            .tasks
            .set_project(task_id, Some(project_id.clone()))
            .await?
        {
            return Err(ServiceError::task_not_found(task_id));
        }

        tracing::info!(%project_id, %task_id, "Task assigned to project");
        Ok(())
    }

    /// Returns tasks belonging to projects whose name matches `name`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty or invalid pattern.
    pub async fn get_tasks_by_project_name(&self, name: &str) -> Result<Vec<Task>, ServiceError> {
        let pattern = parse_required_pattern("name", name)?;

        let project_ids: Vec<ProjectId> = self
            .projects
            .find(ProjectFilter::NameMatches(pattern), None)
            .await?
            .into_iter()
            .map(|project| project.project_id)
            .collect();

        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .tasks
            .find(TaskFilter::InProjects(project_ids), None)
            .await?)
    }

    /// Returns projects sorted ascending by `startDate` or `dueDate`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for any other field name.
    pub async fn get_projects_by_sort_date(
        &self,
        field: &str,
    ) -> Result<Vec<Project>, ServiceError> {
        let field = parse_project_sort_field(field)?;
        Ok(self.projects.find(ProjectFilter::All, Some(field)).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
