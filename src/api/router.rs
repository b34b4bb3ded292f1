//! Route table.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, health_check};
use super::{due, projects, tasks};

/// Builds the application router with tracing and CORS layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Tasks
        .route("/tasks/create", post(tasks::create_task))
        .route("/tasks/list", get(tasks::get_tasks))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/{id}/done", post(tasks::toggle_task_completion))
        .route("/tasks/status/{status}", get(tasks::get_tasks_by_status))
        .route("/tasks/name/{name}", get(tasks::get_tasks_by_name))
        .route(
            "/tasks/sort/date/{sort_type}",
            get(tasks::get_tasks_by_sort_date),
        )
        // Projects
        .route("/projects/create", post(projects::create_project))
        .route("/projects/list", get(projects::get_projects))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/assign/{project_id}/{task_id}",
            post(projects::assign_task_to_project),
        )
        .route(
            "/projects/projectName/{name}",
            get(projects::get_tasks_by_project_name),
        )
        .route(
            "/projects/sort/date/{sort_type}",
            get(projects::get_projects_by_sort_date),
        )
        // Due items
        .route(
            "/bonus/due/projects",
            get(due::get_all_projects_with_due_tasks),
        )
        .route("/bonus/due/tasks", get(due::get_all_tasks_with_due_projects))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
