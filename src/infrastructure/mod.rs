//! Infrastructure layer for the to-do list.
//!
//! This module provides:
//! - Repository traits and the filters they accept
//! - In-memory and `PostgreSQL` implementations
//! - A factory that selects the backend from configuration
//! - The clock used for "now"

mod clock;
mod factory;
mod in_memory;
mod postgres;
mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use factory::{
    ConfigurationError, DEFAULT_MAX_CONNECTIONS, FactoryError, Repositories, StorageMode,
    StoreConfig, StoreConfigBuilder, StoreFactory,
};
pub use in_memory::{InMemoryProjectRepository, InMemoryTaskRepository};
pub use postgres::{PostgresProjectRepository, PostgresTaskRepository, initialize_schema};
pub use repository::{
    ProjectFilter, ProjectRepository, RepositoryError, RepositoryFuture, TaskFilter,
    TaskRepository,
};
