//! Service error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::RepositoryError;

// =============================================================================
// Field / Validation Errors
// =============================================================================

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation error carrying one or more field errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summarize(.errors))]
pub struct ValidationError {
    /// Field-level errors.
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    /// Returns the first field that failed, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.errors.first().map(|error| error.field.as_str())
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by the task, project and due-item services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity, e.g. `"Task"`.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Creates a `NotFound` error for a task.
    #[must_use]
    pub fn task_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: "Task",
            id: id.to_string(),
        }
    }

    /// Creates a `NotFound` error for a project.
    #[must_use]
    pub fn project_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: "Project",
            id: id.to_string(),
        }
    }
}
