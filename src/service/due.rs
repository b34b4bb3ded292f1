//! Read-only queries for items that are due soon.
//!
//! The due window is `[now - 1 day, now + 1 day)` and is recomputed from the
//! clock on every call.

use std::sync::Arc;

use crate::domain::{DueWindow, Project, ProjectId, Task, TaskId};
use crate::infrastructure::{Clock, ProjectFilter, ProjectRepository, TaskFilter, TaskRepository};

use super::error::ServiceError;

/// Answers "what is due around now" for projects and tasks.
///
/// Both queries are two reads joined in memory; nothing is written.
#[derive(Clone)]
pub struct DueItemService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DueItemService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("DueItemService").finish_non_exhaustive()
    }
}

impl DueItemService {
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

    fn window(&self) -> DueWindow {
        DueWindow::around(self.clock.timestamp())
    }

    /// Returns projects listing at least one task whose due date is in the
    /// due window.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_all_projects_with_due_tasks(&self) -> Result<Vec<Project>, ServiceError> {
        let due_task_ids: Vec<TaskId> = self
            .tasks
            .find(TaskFilter::DueWithin(self.window()), None)
            .await?
            .into_iter()
            .map(|task| task.task_id)
            .collect();

        if due_task_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .projects
            .find(ProjectFilter::ContainsAnyTask(due_task_ids), None)
            .await?)
    }

    /// Returns tasks whose project's due date is in the due window.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_all_tasks_with_due_projects(&self) -> Result<Vec<Task>, ServiceError> {
        let due_project_ids: Vec<ProjectId> = self
            .projects
            .find(ProjectFilter::DueWithin(self.window()), None)
            .await?
            .into_iter()
            .map(|project| project.project_id)
            .collect();

        if due_project_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .tasks
            .find(TaskFilter::InProjects(due_project_ids), None)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;
    use crate::infrastructure::{FixedClock, InMemoryProjectRepository, InMemoryTaskRepository};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct Fixture {
        service: DueItemService,
        tasks: Arc<InMemoryTaskRepository>,
        projects: Arc<InMemoryProjectRepository>,
        now: Timestamp,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let projects = Arc::new(InMemoryProjectRepository::new());
        let service = DueItemService::new(
            tasks.clone(),
            projects.clone(),
            Arc::new(FixedClock::new(now)),
        );
        Fixture {
            service,
            tasks,
            projects,
            now: Timestamp::from_datetime(now),
        }
    }

    fn days_from(now: Timestamp, days: i64) -> Timestamp {
        Timestamp::from_datetime(*now.as_datetime() + Duration::days(days))
    }

    /// Stores a project with its tasks and the matching back-references.
    async fn seed(fixture: &Fixture, project: Project, tasks: Vec<Task>) -> Project {
        let project = tasks
            .iter()
            .fold(project, |project, task| project.attach_task(task.task_id.clone()));
        let tasks: Vec<Task> = tasks
            .into_iter()
            .map(|task| task.with_project(Some(project.project_id.clone())))
            .collect();
        fixture.projects.insert(&project).await.unwrap();
        fixture.tasks.insert_many(&tasks).await.unwrap();
        project
    }

    #[rstest]
    #[tokio::test]
    async fn test_projects_with_due_tasks(fixture: Fixture) {
        let old = Timestamp::from_datetime(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let due_project = seed(
            &fixture,
            Project::new(ProjectId::generate(), "P1", old),
            vec![Task::new(TaskId::generate(), "T1", fixture.now)],
        )
        .await;
        seed(
            &fixture,
            Project::new(ProjectId::generate(), "P2", old),
            vec![Task::new(TaskId::generate(), "T2", days_from(fixture.now, 5))],
        )
        .await;
        seed(&fixture, Project::new(ProjectId::generate(), "Empty", old), Vec::new()).await;

        let found = fixture.service.get_all_projects_with_due_tasks().await.unwrap();

        assert_eq!(found, vec![due_project]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_projects_with_due_tasks_none_due(fixture: Fixture) {
        seed(
            &fixture,
            Project::new(ProjectId::generate(), "P", fixture.now),
            vec![Task::new(TaskId::generate(), "T", days_from(fixture.now, -2))],
        )
        .await;

        let found = fixture.service.get_all_projects_with_due_tasks().await.unwrap();

        assert!(found.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_tasks_with_due_projects(fixture: Fixture) {
        let later = days_from(fixture.now, 10);
        seed(
            &fixture,
            Project::new(ProjectId::generate(), "Due", fixture.now),
            vec![
                Task::new(TaskId::generate(), "A", later),
                Task::new(TaskId::generate(), "B", later),
            ],
        )
        .await;
        seed(
            &fixture,
            Project::new(ProjectId::generate(), "Later", later),
            vec![Task::new(TaskId::generate(), "C", fixture.now)],
        )
        .await;
        fixture
            .tasks
            .insert(&Task::new(TaskId::generate(), "Loose", fixture.now))
            .await
            .unwrap();

        let names: Vec<String> = fixture
            .service
            .get_all_tasks_with_due_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.name)
            .collect();

        assert_eq!(names, vec!["A", "B"]);
    }
}
