//! Domain module for the to-do list.
//!
//! This module contains domain models and value objects.

pub mod due;
pub mod pattern;
pub mod project;
pub mod task;

pub use due::DueWindow;
pub use pattern::Pattern;
pub use project::{Project, ProjectId, ProjectSortField};
pub use task::{
    InvalidSortField, InvalidTaskStatus, Task, TaskId, TaskSortField, TaskStatus, Timestamp,
};
