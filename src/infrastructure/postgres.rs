//! `PostgreSQL` repository implementations.
//!
//! This module provides `PostgreSQL`-based implementations of the repository
//! traits using `sqlx`. Entities are stored as JSONB documents. Id and date
//! filters are pushed down into SQL; pattern filters run on the fetched rows
//! with the same `regex` engine the in-memory store uses, since Postgres `~`
//! speaks a different dialect.
//!
//! # Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - JSONB storage, one document per row
//! - Natural order through a `seq` identity column
//! - Array updates on `Project.tasks` under `SELECT ... FOR UPDATE`
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id UUID PRIMARY KEY,
//!     seq BIGSERIAL,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE IF NOT EXISTS projects (
//!     id UUID PRIMARY KEY,
//!     seq BIGSERIAL,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use serde::de::DeserializeOwned;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{Project, ProjectId, ProjectSortField, Task, TaskId, TaskSortField};
use crate::infrastructure::{
    ProjectFilter, ProjectRepository, RepositoryError, RepositoryFuture, TaskFilter,
    TaskRepository,
};

const CREATE_TASKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (\
     id UUID PRIMARY KEY, \
     seq BIGSERIAL, \
     data JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

const CREATE_PROJECTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS projects (\
     id UUID PRIMARY KEY, \
     seq BIGSERIAL, \
     data JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

/// Creates the `tasks` and `projects` tables if they do not exist yet.
///
/// # Errors
///
/// Returns `RepositoryError::DatabaseError` if a statement fails.
pub async fn initialize_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in [CREATE_TASKS_TABLE, CREATE_PROJECTS_TABLE] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;
    }
    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Deserializes `data` columns into domain entities.
fn decode_rows<T: DeserializeOwned>(
    rows: Vec<(serde_json::Value,)>,
) -> Result<Vec<T>, RepositoryError> {
    rows.into_iter()
        .map(|(data,)| serde_json::from_value(data))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

fn encode<T: serde::Serialize>(entity: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(entity)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

/// JSONB key holding the value a task list is sorted by.
const fn task_sort_key(field: TaskSortField) -> &'static str {
    match field {
        TaskSortField::StartDate => "start_date",
        TaskSortField::DueDate => "due_date",
        TaskSortField::DoneDate => "done_date",
    }
}

const fn project_sort_key(field: ProjectSortField) -> &'static str {
    match field {
        ProjectSortField::StartDate => "start_date",
        ProjectSortField::DueDate => "due_date",
    }
}

fn uuid_strings<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a uuid::Uuid>,
{
    ids.into_iter().map(ToString::to_string).collect()
}

/// Appends the `AND ...` clause for a task filter.
///
/// Pattern filters add nothing here; see [`retain_tasks`].
fn push_task_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    match filter {
        TaskFilter::All | TaskFilter::StatusMatches(_) | TaskFilter::NameMatches(_) => {}
        TaskFilter::InProjects(project_ids) => {
            builder
                .push(" AND data->>'project_id' = ANY(")
                .push_bind(uuid_strings(project_ids.iter().map(ProjectId::as_uuid)))
                .push(")");
        }
        TaskFilter::DueWithin(window) => {
            builder
                .push(" AND (data->>'due_date')::timestamptz >= ")
                .push_bind(*window.start.as_datetime())
                .push(" AND (data->>'due_date')::timestamptz < ")
                .push_bind(*window.end.as_datetime());
        }
    }
}

/// Appends the `AND ...` clause for a project filter.
fn push_project_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    match filter {
        ProjectFilter::All | ProjectFilter::NameMatches(_) => {}
        ProjectFilter::ContainsAnyTask(task_ids) => {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM jsonb_array_elements_text(data->'tasks') \
                     AS member(id) WHERE member.id = ANY(",
                )
                .push_bind(uuid_strings(task_ids.iter().map(TaskId::as_uuid)))
                .push("))");
        }
        ProjectFilter::DueWithin(window) => {
            builder
                .push(" AND (data->>'due_date')::timestamptz >= ")
                .push_bind(*window.start.as_datetime())
                .push(" AND (data->>'due_date')::timestamptz < ")
                .push_bind(*window.end.as_datetime());
        }
    }
}

/// Applies pattern filters to decoded tasks; other filters already ran in SQL.
fn retain_tasks(tasks: Vec<Task>, filter: &TaskFilter) -> Vec<Task> {
    match filter {
        TaskFilter::StatusMatches(_) | TaskFilter::NameMatches(_) => {
            tasks.into_iter().filter(|task| filter.matches(task)).collect()
        }
        _ => tasks,
    }
}

fn retain_projects(projects: Vec<Project>, filter: &ProjectFilter) -> Vec<Project> {
    match filter {
        ProjectFilter::NameMatches(_) => projects
            .into_iter()
            .filter(|project| filter.matches(project))
            .collect(),
        _ => projects,
    }
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/todo").await?;
/// initialize_schema(&pool).await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.insert(&task).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let pool = self.pool.clone();
        let task_id = id.clone();

        Box::pin(async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM tasks WHERE id = $1")
                    .bind(task_id.as_uuid())
                    .fetch_optional(&pool)
                    .await
                    .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            row.map(|(data,)| serde_json::from_value(data))
                .transpose()
                .map_err(|error| RepositoryError::SerializationError(error.to_string()))
        })
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let task = task.clone();

        Box::pin(async move {
            let task_data = encode(&task)?;
            sqlx::query("INSERT INTO tasks (id, data) VALUES ($1, $2)")
                .bind(task.task_id.as_uuid())
                .bind(&task_data)
                .execute(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;
            Ok(())
        })
    }

    fn insert_many(&self, tasks: &[Task]) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let tasks = tasks.to_vec();

        Box::pin(async move {
            let mut transaction = pool
                .begin()
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            // One statement per row keeps `seq` in input order
            for task in &tasks {
                let task_data = encode(task)?;
                sqlx::query("INSERT INTO tasks (id, data) VALUES ($1, $2)")
                    .bind(task.task_id.as_uuid())
                    .bind(&task_data)
                    .execute(&mut *transaction)
                    .await
                    .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;
            }

            transaction
                .commit()
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))
        })
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let task = task.clone();

        Box::pin(async move {
            let task_data = encode(&task)?;
            let result = sqlx::query("UPDATE tasks SET data = $1 WHERE id = $2")
                .bind(&task_data)
                .bind(task.task_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(format!("task {}", task.task_id)));
            }
            Ok(())
        })
    }

    fn set_project(&self, id: &TaskId, project_id: Option<ProjectId>) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let task_id = id.clone();

        Box::pin(async move {
            let project_id = project_id.map(|project_id| project_id.to_string());
            let result = sqlx::query(
                "UPDATE tasks SET data = CASE \
                     WHEN $2::text IS NULL THEN data - 'project_id' \
                     ELSE jsonb_set(data, '{project_id}', to_jsonb($2::text)) \
                 END \
                 WHERE id = $1",
            )
            .bind(task_id.as_uuid())
            .bind(project_id)
            .execute(&pool)
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn clear_project(&self, project_id: &ProjectId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let project_id = project_id.to_string();

        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE tasks SET data = data - 'project_id' WHERE data->>'project_id' = $1",
            )
            .bind(project_id)
            .execute(&pool)
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(result.rows_affected())
        })
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let task_id = id.clone();

        Box::pin(async move {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(task_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn find(
        &self,
        filter: TaskFilter,
        sort: Option<TaskSortField>,
    ) -> RepositoryFuture<Vec<Task>> {
        let pool = self.pool.clone();

        Box::pin(async move {
            let mut builder = QueryBuilder::<Postgres>::new("SELECT data FROM tasks WHERE TRUE");
            push_task_filter(&mut builder, &filter);

            match sort {
                Some(field) => {
                    let key = task_sort_key(field);
                    builder.push(format!(
                        " AND data->>'{key}' IS NOT NULL \
                         ORDER BY (data->>'{key}')::timestamptz ASC, seq ASC"
                    ));
                }
                None => {
                    builder.push(" ORDER BY seq ASC");
                }
            }

            let rows: Vec<(serde_json::Value,)> = builder
                .build_query_as()
                .fetch_all(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(retain_tasks(decode_rows(rows)?, &filter))
        })
    }
}

// =============================================================================
// PostgreSQL Project Repository
// =============================================================================

/// `PostgreSQL` implementation of `ProjectRepository`.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a new `PostgreSQL` project repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a project under a row lock, applies `update` and writes it back.
    ///
    /// Returns `Ok(false)` if the project does not exist.
    async fn modify<F>(pool: &PgPool, id: &ProjectId, update: F) -> Result<bool, RepositoryError>
    where
        F: FnOnce(Project) -> Project + Send,
    {
        let mut transaction = pool
            .begin()
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM projects WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *transaction)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

        let Some((data,)) = row else {
            return Ok(false);
        };

        let project: Project = serde_json::from_value(data)
            .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;
        let project_data = encode(&update(project))?;

        sqlx::query("UPDATE projects SET data = $1 WHERE id = $2")
            .bind(&project_data)
            .bind(id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

        transaction
            .commit()
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

        Ok(true)
    }
}

impl ProjectRepository for PostgresProjectRepository {
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let pool = self.pool.clone();
        let project_id = id.clone();

        Box::pin(async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM projects WHERE id = $1")
                    .bind(project_id.as_uuid())
                    .fetch_optional(&pool)
                    .await
                    .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            row.map(|(data,)| serde_json::from_value(data))
                .transpose()
                .map_err(|error| RepositoryError::SerializationError(error.to_string()))
        })
    }

    fn insert(&self, project: &Project) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let project = project.clone();

        Box::pin(async move {
            let project_data = encode(&project)?;
            sqlx::query("INSERT INTO projects (id, data) VALUES ($1, $2)")
                .bind(project.project_id.as_uuid())
                .bind(&project_data)
                .execute(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;
            Ok(())
        })
    }

    fn update_details(&self, project: &Project) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let project = project.clone();

        Box::pin(async move {
            let project_data = encode(&project)?;
            // Merge every top-level key except `tasks` into the stored document
            let result = sqlx::query(
                "UPDATE projects SET data = data || ($1::jsonb - 'tasks') WHERE id = $2",
            )
            .bind(&project_data)
            .bind(project.project_id.as_uuid())
            .execute(&pool)
            .await
            .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete(&self, id: &ProjectId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let project_id = id.clone();

        Box::pin(async move {
            let result = sqlx::query("DELETE FROM projects WHERE id = $1")
                .bind(project_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn find(
        &self,
        filter: ProjectFilter,
        sort: Option<ProjectSortField>,
    ) -> RepositoryFuture<Vec<Project>> {
        let pool = self.pool.clone();

        Box::pin(async move {
            let mut builder =
                QueryBuilder::<Postgres>::new("SELECT data FROM projects WHERE TRUE");
            push_project_filter(&mut builder, &filter);

            match sort {
                Some(field) => {
                    let key = project_sort_key(field);
                    builder.push(format!(
                        " ORDER BY (data->>'{key}')::timestamptz ASC, seq ASC"
                    ));
                }
                None => {
                    builder.push(" ORDER BY seq ASC");
                }
            }

            let rows: Vec<(serde_json::Value,)> = builder
                .build_query_as()
                .fetch_all(&pool)
                .await
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;

            Ok(retain_projects(decode_rows(rows)?, &filter))
        })
    }

    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let project_id = id.clone();
        let task_id = task_id.clone();

        Box::pin(async move {
            Self::modify(&pool, &project_id, |project| project.attach_task(task_id)).await
        })
    }

    fn pull_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let project_id = id.clone();
        let task_id = task_id.clone();

        Box::pin(async move {
            Self::modify(&pool, &project_id, |project| project.detach_task(&task_id)).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
