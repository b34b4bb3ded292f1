//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod due;
pub mod error;
pub mod handlers;
pub mod projects;
pub mod router;
pub mod tasks;

pub use dto::{
    CreateTaskRequest, ProjectRequest, ProjectResponse, TaskResponse, UpdateTaskRequest,
};
pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{AppState, HealthResponse, health_check};
pub use router::build_router;
