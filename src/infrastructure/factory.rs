//! Store factory for runtime backend selection.
//!
//! This module builds repository instances from environment configuration.
//! It supports switching between the in-memory and `PostgreSQL` backends at
//! runtime.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default 5)
//!
//! # Example
//!
//! ```ignore
//! use todo_list_api::infrastructure::{StoreConfig, StoreFactory};
//!
//! let config = StoreConfig::from_env()?;
//! let repositories = StoreFactory::new(config).create().await?;
//! let task = repositories.task_repository.find_by_id(&task_id).await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use super::{
    InMemoryProjectRepository, InMemoryTaskRepository, PostgresProjectRepository,
    PostgresTaskRepository, ProjectRepository, TaskRepository, initialize_schema,
};

/// Pool size used when `DATABASE_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage mode for persistent data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// In-memory storage. Suitable for testing and development.
    #[default]
    InMemory,
    /// `PostgreSQL` storage for production use.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the store factory.
///
/// Use `StoreConfigBuilder` for a fluent API to construct this.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Storage mode for tasks and projects.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    /// Maximum number of pooled `PostgreSQL` connections.
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `DATABASE_MAX_CONNECTIONS` is not a positive integer
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = match env::var("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        // Empty or whitespace-only URLs count as unset
        let database_url = env::var("DATABASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => parse_max_connections(&value)?,
            Err(env::VarError::NotPresent) => DEFAULT_MAX_CONNECTIONS,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidMaxConnections(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        let config = Self {
            storage_mode,
            database_url,
            max_connections,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the database URL is missing for
    /// `PostgreSQL` storage or the pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }

        if self.max_connections == 0 {
            return Err(ConfigurationError::InvalidMaxConnections("0".to_string()));
        }

        Ok(())
    }
}

fn parse_max_connections(value: &str) -> Result<u32, ConfigurationError> {
    match value.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigurationError::InvalidMaxConnections(value.to_string())),
    }
}

/// Builder for `StoreConfig`.
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/todo")
///     .max_connections(10)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
    max_connections: u32,
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn max_connections(mut self, count: u32) -> Self {
        self.max_connections = count;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<StoreConfig, ConfigurationError> {
        let config = StoreConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
            max_connections: self.max_connections,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while reading store configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Pool size that is not a positive integer.
    #[error("Invalid DATABASE_MAX_CONNECTIONS: '{0}'. Expected a positive integer")]
    InvalidMaxConnections(String),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Schema creation error.
    #[error("Schema initialization error: {0}")]
    Schema(String),
}

// =============================================================================
// Store Factory
// =============================================================================

/// Collection of initialized repositories.
///
/// The optional pool is kept so the server can close it on shutdown.
#[derive(Clone)]
pub struct Repositories {
    /// Task repository.
    pub task_repository: Arc<dyn TaskRepository>,
    /// Project repository.
    pub project_repository: Arc<dyn ProjectRepository>,
    /// Connection pool when backed by `PostgreSQL`.
    pub pool: Option<PgPool>,
}

impl Repositories {
    /// Creates empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            task_repository: Arc::new(InMemoryTaskRepository::new()),
            project_repository: Arc::new(InMemoryProjectRepository::new()),
            pool: None,
        }
    }

    /// Creates `PostgreSQL`-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            task_repository: Arc::new(PostgresTaskRepository::new(pool.clone())),
            project_repository: Arc::new(PostgresProjectRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Closes the connection pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("task_repository", &"Arc<dyn TaskRepository>")
            .field("project_repository", &"Arc<dyn ProjectRepository>")
            .field("pool", &self.pool.is_some())
            .finish()
    }
}

/// Factory for creating repository instances based on configuration.
#[derive(Debug, Clone)]
pub struct StoreFactory {
    config: StoreConfig,
}

impl StoreFactory {
    /// Creates a new factory with the given configuration.
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Creates the repositories for the configured storage mode.
    ///
    /// For `PostgreSQL` this opens the pool and creates missing tables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database connection or schema
    /// creation fails.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Repositories::in_memory()),
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                initialize_schema(&pool)
                    .await
                    .map_err(|error| FactoryError::Schema(error.to_string()))?;
                Ok(Repositories::postgres(pool))
            }
        }
    }

    /// Creates a `PostgreSQL` connection pool.
    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
