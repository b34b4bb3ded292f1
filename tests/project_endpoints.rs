//! Integration tests for the project endpoints, including task assignment.

mod common;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use common::{create_named_task, create_project, create_test_app_state, send};
use todo_list_api::api::{AppState, ProjectRequest, TaskResponse, projects, tasks};
use todo_list_api::domain::ProjectId;

async fn assign(state: &AppState, project_id: &str, task_id: &str) -> StatusCode {
    projects::assign_task_to_project(
        State(state.clone()),
        Path((project_id.to_string(), task_id.to_string())),
    )
    .await
    .expect("Failed to assign task")
}

async fn fetch_task(state: &AppState, task_id: &str) -> TaskResponse {
    let Json(task) = tasks::get_task(State(state.clone()), Path(task_id.to_string()))
        .await
        .unwrap();
    task
}

// =============================================================================
// CRUD Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_project_starts_empty() {
    let state = create_test_app_state();

    let project = create_project(&state, "Home", Some("2023-01-01"), Some("2023-02-01")).await;

    assert_eq!(project.name, "Home");
    assert_eq!(project.start_date, "2023-01-01T00:00:00.000Z");
    assert_eq!(project.due_date, "2023-02-01T00:00:00.000Z");
    assert!(project.tasks.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_create_project_rejects_due_before_start() {
    let state = create_test_app_state();

    let error = projects::create_project(
        State(state),
        Json(ProjectRequest {
            name: Some("Backwards".to_string()),
            start_date: Some("2023-03-01".to_string()),
            due_date: Some("2023-01-01".to_string()),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(error.status, StatusCode::BAD_REQUEST);
    assert_eq!(error.error.details.unwrap()[0].field, "dueDate");
}

#[rstest]
#[tokio::test]
async fn test_update_project_keeps_tasks() {
    let state = create_test_app_state();
    let project = create_project(&state, "Before", None, None).await;
    let task = create_named_task(&state, "member").await;
    assign(&state, &project.id, &task.id).await;

    let Json(updated) = projects::update_project(
        State(state),
        Path(project.id.clone()),
        Json(ProjectRequest {
            name: Some("After".to_string()),
            start_date: Some("2023-05-01".to_string()),
            due_date: Some("2023-06-01".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.start_date, "2023-05-01T00:00:00.000Z");
    assert_eq!(updated.tasks, vec![task.id]);
}

#[rstest]
#[tokio::test]
async fn test_get_project_not_found() {
    let state = create_test_app_state();

    let error = projects::get_project(State(state), Path(ProjectId::generate().to_string()))
        .await
        .unwrap_err();

    assert_eq!(error.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_delete_project_unassigns_tasks() {
    let state = create_test_app_state();
    let project = create_project(&state, "Short lived", None, None).await;
    let task = create_named_task(&state, "survivor").await;
    assign(&state, &project.id, &task.id).await;

    let status = projects::delete_project(State(state.clone()), Path(project.id.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(all) = projects::get_projects(State(state.clone())).await.unwrap();
    assert!(all.is_empty());
    assert_eq!(fetch_task(&state, &task.id).await.project_id, None);
}

// =============================================================================
// POST /projects/assign/{projectId}/{taskId} Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_assign_task_links_both_sides() {
    let state = create_test_app_state();
    let project = create_project(&state, "P1", None, None).await;
    let task = create_named_task(&state, "T1").await;

    assert_eq!(assign(&state, &project.id, &task.id).await, StatusCode::NO_CONTENT);

    let Json(stored) = projects::get_project(State(state.clone()), Path(project.id.clone()))
        .await
        .unwrap();
    assert_eq!(stored.tasks, vec![task.id.clone()]);
    assert_eq!(
        fetch_task(&state, &task.id).await.project_id,
        Some(project.id)
    );
}

#[rstest]
#[tokio::test]
async fn test_assign_task_twice_is_idempotent() {
    let state = create_test_app_state();
    let project = create_project(&state, "P1", None, None).await;
    let task = create_named_task(&state, "T1").await;

    assign(&state, &project.id, &task.id).await;
    assign(&state, &project.id, &task.id).await;

    let Json(stored) = projects::get_project(State(state), Path(project.id))
        .await
        .unwrap();
    assert_eq!(stored.tasks, vec![task.id]);
}

#[rstest]
#[tokio::test]
async fn test_reassign_task_moves_it() {
    let state = create_test_app_state();
    let first = create_project(&state, "First", None, None).await;
    let second = create_project(&state, "Second", None, None).await;
    let task = create_named_task(&state, "mover").await;

    assign(&state, &first.id, &task.id).await;
    assign(&state, &second.id, &task.id).await;

    let Json(first) = projects::get_project(State(state.clone()), Path(first.id))
        .await
        .unwrap();
    let Json(second) = projects::get_project(State(state.clone()), Path(second.id.clone()))
        .await
        .unwrap();
    assert!(first.tasks.is_empty());
    assert_eq!(second.tasks, vec![task.id.clone()]);
    assert_eq!(fetch_task(&state, &task.id).await.project_id, Some(second.id));
}

#[rstest]
#[tokio::test]
async fn test_assign_unknown_task_changes_nothing() {
    let state = create_test_app_state();
    let project = create_project(&state, "P1", None, None).await;

    let error = projects::assign_task_to_project(
        State(state.clone()),
        Path((project.id.clone(), ProjectId::generate().to_string())),
    )
    .await
    .unwrap_err();

    assert_eq!(error.status, StatusCode::NOT_FOUND);
    let Json(stored) = projects::get_project(State(state), Path(project.id))
        .await
        .unwrap();
    assert!(stored.tasks.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_deleting_task_removes_it_from_project() {
    let state = create_test_app_state();
    let project = create_project(&state, "P1", None, None).await;
    let keep = create_named_task(&state, "keep").await;
    let removed = create_named_task(&state, "removed").await;
    assign(&state, &project.id, &keep.id).await;
    assign(&state, &project.id, &removed.id).await;

    tasks::delete_task(State(state.clone()), Path(removed.id))
        .await
        .unwrap();

    let Json(stored) = projects::get_project(State(state), Path(project.id))
        .await
        .unwrap();
    assert_eq!(stored.tasks, vec![keep.id]);
}

// =============================================================================
// Query Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_get_tasks_by_project_name() {
    let state = create_test_app_state();
    let garden = create_project(&state, "Garden", None, None).await;
    let office = create_project(&state, "Office", None, None).await;
    let weed = create_named_task(&state, "weed").await;
    let file = create_named_task(&state, "file").await;
    create_named_task(&state, "loose").await;
    assign(&state, &garden.id, &weed.id).await;
    assign(&state, &office.id, &file.id).await;

    let Json(found) =
        projects::get_tasks_by_project_name(State(state.clone()), Path("^Gar".to_string()))
            .await
            .unwrap();
    let names: Vec<_> = found.iter().map(|task| task.name.as_str()).collect();
    assert_eq!(names, vec!["weed"]);

    let Json(none) =
        projects::get_tasks_by_project_name(State(state), Path("Nowhere".to_string()))
            .await
            .unwrap();
    assert!(none.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_get_projects_by_sort_date_start() {
    let state = create_test_app_state();
    for (name, start) in [("third", "2023-01-03"), ("first", "2023-01-01"), ("second", "2023-01-02")] {
        create_project(&state, name, Some(start), None).await;
    }

    let Json(sorted) =
        projects::get_projects_by_sort_date(State(state.clone()), Path("startDate".to_string()))
            .await
            .unwrap();

    let names: Vec<_> = sorted.iter().map(|project| project.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);

    let error = projects::get_projects_by_sort_date(State(state), Path("doneDate".to_string()))
        .await
        .unwrap_err();
    assert_eq!(error.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Router Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_router_project_flow() {
    let state = create_test_app_state();

    let (status, project) = send(
        &state,
        "POST",
        "/projects/create",
        Some(json!({ "name": "Launch", "startDate": "2024-06-01", "dueDate": "2024-07-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["tasks"], json!([]));
    let project_id = project["id"].as_str().unwrap().to_string();

    let (_, task) = send(&state, "POST", "/tasks/create", Some(json!({ "name": "Ship" }))).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &state,
        "POST",
        &format!("/projects/assign/{project_id}/{task_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, found) = send(&state, "GET", "/projects/projectName/Launch", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["id"], task_id.as_str());
    assert_eq!(found[0]["projectId"], project_id.as_str());

    let (status, body) = send(
        &state,
        "PUT",
        &format!("/projects/{project_id}"),
        Some(json!({ "name": "Relaunch" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Relaunch");
    assert_eq!(body["tasks"], json!([task_id]));

    let (status, _) = send(&state, "DELETE", &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = send(&state, "GET", "/projects/list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_router_assign_malformed_ids() {
    let state = create_test_app_state();

    let (status, body) = send(&state, "POST", "/projects/assign/abc/def", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "projectId");
}
