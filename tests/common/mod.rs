//! Common test helpers for integration tests.
//!
//! Every state built here runs on in-memory repositories and a clock pinned
//! to [`NOW`], so due-window tests are deterministic.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate. Helpers used by only one test
//! file would otherwise generate dead code warnings in the others.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use todo_list_api::api::{
    AppState, CreateTaskRequest, ProjectRequest, ProjectResponse, TaskResponse, build_router,
    projects, tasks,
};
use todo_list_api::infrastructure::{FixedClock, Repositories};

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// The instant every test clock reports.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Creates a test `AppState` with in-memory repositories and a fixed clock.
pub fn create_test_app_state() -> AppState {
    AppState::new(&Repositories::in_memory(), Arc::new(FixedClock::new(now())))
}

// =============================================================================
// Fixture Helpers
// =============================================================================

/// Creates a task through the handler and returns the response body.
pub async fn create_task(state: &AppState, request: CreateTaskRequest) -> TaskResponse {
    let (status, Json(task)) = tasks::create_task(State(state.clone()), Json(request))
        .await
        .expect("Failed to create task");
    assert_eq!(status, StatusCode::CREATED);
    task
}

/// Creates a task with only a name.
pub async fn create_named_task(state: &AppState, name: &str) -> TaskResponse {
    create_task(
        state,
        CreateTaskRequest {
            name: Some(name.to_string()),
            ..CreateTaskRequest::default()
        },
    )
    .await
}

/// Creates a project through the handler and returns the response body.
pub async fn create_project(
    state: &AppState,
    name: &str,
    start_date: Option<&str>,
    due_date: Option<&str>,
) -> ProjectResponse {
    let (status, Json(project)) = projects::create_project(
        State(state.clone()),
        Json(ProjectRequest {
            name: Some(name.to_string()),
            start_date: start_date.map(ToString::to_string),
            due_date: due_date.map(ToString::to_string),
        }),
    )
    .await
    .expect("Failed to create project");
    assert_eq!(status, StatusCode::CREATED);
    project
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Sends one request through the full router and decodes the JSON body.
///
/// Returns `Value::Null` for empty bodies.
pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
