//! Service layer.
//!
//! Services validate input, apply the business rules and talk to the
//! repositories. They are cheap to clone and shared through the axum state.

mod due;
mod error;
mod project;
mod task;
pub mod validation;

pub use due::DueItemService;
pub use error::{FieldError, ServiceError, ValidationError};
pub use project::{ProjectInput, ProjectService};
pub use task::{NewTask, TaskService};
