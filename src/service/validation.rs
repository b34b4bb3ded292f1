//! Input validation shared by the services.
//!
//! Every function returns the first problem it finds as a single-field
//! `ValidationError`. Field names are the camelCase names clients send.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::error::ValidationError;
use crate::domain::{Pattern, ProjectSortField, TaskSortField, TaskStatus, Timestamp};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Validates a required name and returns it trimmed.
///
/// # Errors
///
/// Returns a `ValidationError` on `field` when the name is missing or blank.
pub fn validate_name(field: &str, name: Option<&str>) -> Result<String, ValidationError> {
    match name.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ValidationError::single(field, "Name is required")),
    }
}

/// Parses an optional status, defaulting to `to-do`.
///
/// # Errors
///
/// Returns a `ValidationError` on `status` for anything but `to-do` or `done`.
pub fn parse_status(status: Option<&str>) -> Result<TaskStatus, ValidationError> {
    status.map_or(Ok(TaskStatus::default()), |value| {
        value
            .parse::<TaskStatus>()
            .map_err(|error| ValidationError::single("status", error.to_string()))
    })
}

/// Parses a date supplied by a client.
///
/// Accepts RFC 3339, naive date-times (read as UTC) and plain dates
/// (midnight UTC).
///
/// # Errors
///
/// Returns a `ValidationError` on `field` when no format matches.
pub fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, ValidationError> {
    let value = value.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(Timestamp::from_datetime(datetime.with_timezone(&Utc)));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Timestamp::from_datetime(naive.and_utc()));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Timestamp::from_datetime(naive.and_utc()))
        .ok_or_else(|| ValidationError::single(field, format!("Invalid date: '{value}'")))
}

/// Parses an optional date field.
///
/// # Errors
///
/// See [`parse_timestamp`].
pub fn parse_optional_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Timestamp>, ValidationError> {
    value.map(|value| parse_timestamp(field, value)).transpose()
}

/// Resolves the start and due dates of a new or updated entity.
///
/// Omitted dates fall back to `now`. The ordering check only applies when
/// both dates were supplied.
///
/// # Errors
///
/// Returns a `ValidationError` when a date does not parse or when the
/// supplied start date is after the supplied due date.
pub fn resolve_dates(
    start_date: Option<&str>,
    due_date: Option<&str>,
    now: Timestamp,
) -> Result<(Timestamp, Timestamp), ValidationError> {
    let start = parse_optional_timestamp("startDate", start_date)?;
    let due = parse_optional_timestamp("dueDate", due_date)?;

    if matches!((start, due), (Some(start), Some(due)) if start > due) {
        return Err(ValidationError::single(
            "dueDate",
            "Due date must not be before start date",
        ));
    }

    Ok((start.unwrap_or(now), due.unwrap_or(now)))
}

/// Compiles a pattern; the empty pattern is allowed and matches everything.
///
/// # Errors
///
/// Returns a `ValidationError` on `field` when the regex is invalid.
pub fn parse_pattern(field: &str, source: &str) -> Result<Pattern, ValidationError> {
    Pattern::new(source)
        .map_err(|error| ValidationError::single(field, format!("Invalid pattern: {error}")))
}

/// Compiles a pattern that must not be empty.
///
/// # Errors
///
/// Returns a `ValidationError` on `field` when the pattern is blank or invalid.
pub fn parse_required_pattern(field: &str, source: &str) -> Result<Pattern, ValidationError> {
    if source.trim().is_empty() {
        return Err(ValidationError::single(field, "Name is required"));
    }
    parse_pattern(field, source)
}

/// Parses a task sort field name.
///
/// # Errors
///
/// Returns a `ValidationError` on `sortType` for unknown names.
pub fn parse_task_sort_field(value: &str) -> Result<TaskSortField, ValidationError> {
    value.parse().map_err(|_| {
        ValidationError::single(
            "sortType",
            format!("Invalid sort field: '{value}'. Expected startDate, dueDate or doneDate"),
        )
    })
}

/// Parses a project sort field name.
///
/// # Errors
///
/// Returns a `ValidationError` on `sortType` for unknown names.
pub fn parse_project_sort_field(value: &str) -> Result<ProjectSortField, ValidationError> {
    value.parse().map_err(|_| {
        ValidationError::single(
            "sortType",
            format!("Invalid sort field: '{value}'. Expected startDate or dueDate"),
        )
    })
}

// =============================================================================
// Tests
// =============================================================================
