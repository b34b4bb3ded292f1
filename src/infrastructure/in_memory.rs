//! In-memory repository implementations.
//!
//! This module provides in-memory implementations of the repository traits.
//! They back the default storage mode and every test that does not need a
//! live database.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Insertion-ordered storage via `IndexMap`, so natural order is stable
//! - Each call holds the lock for its whole read or write

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::domain::{Project, ProjectId, ProjectSortField, Task, TaskId, TaskSortField};
use crate::infrastructure::{
    ProjectFilter, ProjectRepository, RepositoryError, RepositoryFuture, TaskFilter,
    TaskRepository,
};

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use todo_list_api::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// let task = Task::new(TaskId::generate(), "My Task", Timestamp::now());
///
/// repository.insert(&task).await?;
/// let found = repository.find_by_id(&task.task_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<IndexMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        Box::pin(async move {
            let guard = tasks.read().await;
            Ok(guard.get(&id).cloned())
        })
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        Box::pin(async move {
            tasks.write().await.insert(task.task_id.clone(), task);
            Ok(())
        })
    }

    fn insert_many(&self, batch: &[Task]) -> RepositoryFuture<()> {
        let tasks = Arc::clone(&self.tasks);
        let batch = batch.to_vec();
        Box::pin(async move {
            let mut guard = tasks.write().await;
            guard.extend(batch.into_iter().map(|task| (task.task_id.clone(), task)));
            Ok(())
        })
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<()> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        Box::pin(async move {
            let mut guard = tasks.write().await;
            match guard.get_mut(&task.task_id) {
                Some(stored) => {
                    *stored = task;
                    Ok(())
                }
                None => Err(RepositoryError::NotFound(format!("task {}", task.task_id))),
            }
        })
    }

    fn set_project(&self, id: &TaskId, project_id: Option<ProjectId>) -> RepositoryFuture<bool> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        Box::pin(async move {
            let mut guard = tasks.write().await;
            Ok(guard.get_mut(&id).is_some_and(|task| {
                task.project_id = project_id;
                true
            }))
        })
    }

    fn clear_project(&self, project_id: &ProjectId) -> RepositoryFuture<u64> {
        let tasks = Arc::clone(&self.tasks);
        let project_id = project_id.clone();
        Box::pin(async move {
            let mut guard = tasks.write().await;
            let mut cleared = 0;
            for task in guard.values_mut() {
                if task.project_id.as_ref() == Some(&project_id) {
                    task.project_id = None;
                    cleared += 1;
                }
            }
            Ok(cleared)
        })
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        Box::pin(async move {
            // shift_remove keeps the natural order of the remaining tasks
            Ok(tasks.write().await.shift_remove(&id).is_some())
        })
    }

    fn find(
        &self,
        filter: TaskFilter,
        sort: Option<TaskSortField>,
    ) -> RepositoryFuture<Vec<Task>> {
        let tasks = Arc::clone(&self.tasks);
        Box::pin(async move {
            let guard = tasks.read().await;
            let selected: Vec<Task> = guard
                .values()
                .filter(|task| filter.matches(task))
                .cloned()
                .collect();
            drop(guard);

            Ok(match sort {
                Some(field) => sort_tasks(selected, field),
                None => selected,
            })
        })
    }
}

/// Stable ascending sort that drops tasks without a value for `field`.
fn sort_tasks(tasks: Vec<Task>, field: TaskSortField) -> Vec<Task> {
    let mut keyed: Vec<_> = tasks
        .into_iter()
        .filter_map(|task| field.key(&task).map(|key| (key, task)))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, task)| task).collect()
}

// =============================================================================
// In-Memory Project Repository
// =============================================================================

/// In-memory implementation of `ProjectRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<IndexMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    /// Creates a new empty in-memory project repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    async fn modify<F>(
        projects: &RwLock<IndexMap<ProjectId, Project>>,
        id: &ProjectId,
        update: F,
    ) -> bool
    where
        F: FnOnce(Project) -> Project,
    {
        let mut guard = projects.write().await;
        match guard.get_mut(id) {
            Some(stored) => {
                *stored = update(stored.clone());
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl ProjectRepository for InMemoryProjectRepository {
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let projects = Arc::clone(&self.projects);
        let id = id.clone();
        Box::pin(async move {
            let guard = projects.read().await;
            Ok(guard.get(&id).cloned())
        })
    }

    fn insert(&self, project: &Project) -> RepositoryFuture<()> {
        let projects = Arc::clone(&self.projects);
        let project = project.clone();
        Box::pin(async move {
            projects
                .write()
                .await
                .insert(project.project_id.clone(), project);
            Ok(())
        })
    }

    fn update_details(&self, project: &Project) -> RepositoryFuture<bool> {
        let projects = Arc::clone(&self.projects);
        let details = project.clone();
        Box::pin(async move {
            let id = details.project_id.clone();
            Ok(Self::modify(&projects, &id, |stored| {
                stored
                    .with_name(details.name)
                    .with_start_date(details.start_date)
                    .with_due_date(details.due_date)
            })
            .await)
        })
    }

    fn delete(&self, id: &ProjectId) -> RepositoryFuture<bool> {
        let projects = Arc::clone(&self.projects);
        let id = id.clone();
        Box::pin(async move { Ok(projects.write().await.shift_remove(&id).is_some()) })
    }

    fn find(
        &self,
        filter: ProjectFilter,
        sort: Option<ProjectSortField>,
    ) -> RepositoryFuture<Vec<Project>> {
        let projects = Arc::clone(&self.projects);
        Box::pin(async move {
            let guard = projects.read().await;
            let mut selected: Vec<Project> = guard
                .values()
                .filter(|project| filter.matches(project))
                .cloned()
                .collect();
            drop(guard);

            if let Some(field) = sort {
                selected.sort_by_key(|project| field.key(project));
            }
            Ok(selected)
        })
    }

    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<bool> {
        let projects = Arc::clone(&self.projects);
        let id = id.clone();
        let task_id = task_id.clone();
        Box::pin(async move {
            Ok(Self::modify(&projects, &id, |project| project.attach_task(task_id)).await)
        })
    }

    fn pull_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<bool> {
        let projects = Arc::clone(&self.projects);
        let id = id.clone();
        let task_id = task_id.clone();
        Box::pin(async move {
            Ok(Self::modify(&projects, &id, |project| project.detach_task(&task_id)).await)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pattern, Timestamp};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    // -------------------------------------------------------------------------
    // Helper functions for tests
    // -------------------------------------------------------------------------

    fn day(day: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0).unwrap())
    }

    fn test_task(name: &str) -> Task {
        Task::new(TaskId::generate(), name, day(1))
    }

    fn test_project(name: &str) -> Project {
        Project::new(ProjectId::generate(), name, day(1))
    }

    // -------------------------------------------------------------------------
    // InMemoryTaskRepository Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_find_by_id_not_found() {
        let repository = InMemoryTaskRepository::new();

        let result = repository.find_by_id(&TaskId::generate()).await;

        assert_eq!(result, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_insert_and_find() {
        let repository = InMemoryTaskRepository::new();
        let task = test_task("Task 1");

        repository.insert(&task).await.unwrap();
        let found = repository.find_by_id(&task.task_id).await.unwrap();

        assert_eq!(found, Some(task));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_find_all_keeps_insertion_order() {
        let repository = InMemoryTaskRepository::new();
        let tasks = vec![test_task("c"), test_task("a"), test_task("b")];
        repository.insert_many(&tasks).await.unwrap();

        let found = repository.find(TaskFilter::All, None).await.unwrap();

        assert_eq!(found, tasks);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_replace_missing_returns_not_found() {
        let repository = InMemoryTaskRepository::new();

        let result = repository.replace(&test_task("ghost")).await;

        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_delete_keeps_order_of_rest() {
        let repository = InMemoryTaskRepository::new();
        let tasks = vec![test_task("1"), test_task("2"), test_task("3")];
        repository.insert_many(&tasks).await.unwrap();

        assert!(repository.delete(&tasks[1].task_id).await.unwrap());
        assert!(!repository.delete(&tasks[1].task_id).await.unwrap());

        let names: Vec<String> = repository
            .find(TaskFilter::All, None)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.name)
            .collect();
        assert_eq!(names, vec!["1", "3"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_set_and_clear_project() {
        let repository = InMemoryTaskRepository::new();
        let project_id = ProjectId::generate();
        let first = test_task("first");
        let second = test_task("second");
        repository
            .insert_many(&[first.clone(), second.clone()])
            .await
            .unwrap();

        assert!(repository
            .set_project(&first.task_id, Some(project_id.clone()))
            .await
            .unwrap());
        assert!(repository
            .set_project(&second.task_id, Some(project_id.clone()))
            .await
            .unwrap());
        assert!(!repository
            .set_project(&TaskId::generate(), Some(project_id.clone()))
            .await
            .unwrap());

        let cleared = repository.clear_project(&project_id).await.unwrap();
        assert_eq!(cleared, 2);

        let remaining = repository
            .find(TaskFilter::InProjects(vec![project_id]), None)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_sort_by_done_date_skips_open_tasks() {
        let repository = InMemoryTaskRepository::new();
        let late = test_task("late").mark_done(day(9));
        let open = test_task("open");
        let early = test_task("early").mark_done(day(3));
        repository
            .insert_many(&[late.clone(), open, early.clone()])
            .await
            .unwrap();

        let sorted = repository
            .find(TaskFilter::All, Some(TaskSortField::DoneDate))
            .await
            .unwrap();

        assert_eq!(sorted, vec![early, late]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_sort_is_stable_for_ties() {
        let repository = InMemoryTaskRepository::new();
        let tasks = vec![
            test_task("b").with_due_date(day(5)),
            test_task("a").with_due_date(day(2)),
            test_task("c").with_due_date(day(5)),
        ];
        repository.insert_many(&tasks).await.unwrap();

        let names: Vec<String> = repository
            .find(TaskFilter::All, Some(TaskSortField::DueDate))
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.name)
            .collect();

        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_find_by_name_pattern() {
        let repository = InMemoryTaskRepository::new();
        repository
            .insert_many(&[test_task("Buy milk"), test_task("Walk dog"), test_task("Buy bread")])
            .await
            .unwrap();

        let found = repository
            .find(TaskFilter::NameMatches(Pattern::new("Buy").unwrap()), None)
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|task| task.name.starts_with("Buy")));
    }

    // -------------------------------------------------------------------------
    // InMemoryProjectRepository Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_insert_and_find() {
        let repository = InMemoryProjectRepository::new();
        let project = test_project("Project 1");

        repository.insert(&project).await.unwrap();

        assert_eq!(
            repository.find_by_id(&project.project_id).await.unwrap(),
            Some(project)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_push_task_never_duplicates() {
        let repository = InMemoryProjectRepository::new();
        let project = test_project("P");
        let task_id = TaskId::generate();
        repository.insert(&project).await.unwrap();

        assert!(repository.push_task(&project.project_id, &task_id).await.unwrap());
        assert!(repository.push_task(&project.project_id, &task_id).await.unwrap());

        let stored = repository
            .find_by_id(&project.project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.tasks, vec![task_id]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_pull_task() {
        let repository = InMemoryProjectRepository::new();
        let task_id = TaskId::generate();
        let project = test_project("P").attach_task(task_id.clone());
        repository.insert(&project).await.unwrap();

        assert!(repository.pull_task(&project.project_id, &task_id).await.unwrap());

        let stored = repository
            .find_by_id(&project.project_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.tasks.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_push_to_missing_project() {
        let repository = InMemoryProjectRepository::new();

        let pushed = repository
            .push_task(&ProjectId::generate(), &TaskId::generate())
            .await
            .unwrap();

        assert!(!pushed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_sort_by_start_date() {
        let repository = InMemoryProjectRepository::new();
        for (name, start) in [("march", 3), ("first", 1), ("second", 2)] {
            repository
                .insert(&test_project(name).with_start_date(day(start)))
                .await
                .unwrap();
        }

        let names: Vec<String> = repository
            .find(ProjectFilter::All, Some(ProjectSortField::StartDate))
            .await
            .unwrap()
            .into_iter()
            .map(|project| project.name)
            .collect();

        assert_eq!(names, vec!["first", "second", "march"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_update_details_and_delete() {
        let repository = InMemoryProjectRepository::new();
        let project = test_project("Old");
        repository.insert(&project).await.unwrap();

        let renamed = project.clone().with_name("New");
        assert!(repository.update_details(&renamed).await.unwrap());
        assert_eq!(
            repository.find_by_id(&project.project_id).await.unwrap(),
            Some(renamed)
        );

        assert!(repository.delete(&project.project_id).await.unwrap());
        assert_eq!(repository.find_by_id(&project.project_id).await.unwrap(), None);
        assert!(!repository.update_details(&project).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn test_project_repository_update_details_keeps_concurrent_task_push() {
        let repository = InMemoryProjectRepository::new();
        let project = test_project("Shared");
        repository.insert(&project).await.unwrap();

        // Read before the push lands, as an in-flight update would
        let stale = repository
            .find_by_id(&project.project_id)
            .await
            .unwrap()
            .unwrap();
        let task_id = TaskId::generate();
        repository
            .push_task(&project.project_id, &task_id)
            .await
            .unwrap();

        repository
            .update_details(&stale.with_name("Renamed"))
            .await
            .unwrap();

        let stored = repository
            .find_by_id(&project.project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.tasks, vec![task_id]);
    }
}
