//! # todo-list-api
//!
//! REST backend for a to-do list application.
//!
//! Tasks carry a name, a status (`to-do` or `done`) and start, due and done
//! dates. Projects group tasks; a task belongs to at most one project. On top
//! of the CRUD surface the crate offers filtering by pattern, date sorting and
//! two due-date queries that look one day either side of the current time.
//!
//! ## Layers
//!
//! - [`domain`]: value types and the rules they enforce on themselves
//! - [`infrastructure`]: repository traits, in-memory and `PostgreSQL`
//!   stores, configuration and the clock
//! - [`service`]: validation and the business operations
//! - [`api`]: axum handlers, DTOs and the router

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod service;
