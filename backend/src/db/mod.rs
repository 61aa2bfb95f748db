//! Database module for course schedule storage.
//!
//! This module provides abstractions for database operations via the
//! Repository pattern, allowing different storage backends to be swapped.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, ingestion pipeline)       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │                              │
//! ┌───▼──────────────┐   ┌───────────▼──────────┐
//! │ LocalRepository  │   │ PostgresRepository   │
//! │   (in-memory)    │   │  (Diesel + r2d2)     │
//! └──────────────────┘   └──────────────────────┘
//! ```
//!
//! - `repository`: trait definitions and error types
//! - `repositories::local`: in-memory implementation for tests and local development
//! - `repositories::postgres`: Postgres implementation (feature `postgres-repo`)
//! - `factory`: creates repository instances from type, env or config file
//! - `repo_config`: `repository.toml` parsing

// Feature flag priority: postgres > local
// When multiple features are enabled (e.g., --all-features), postgres takes precedence.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod checksum;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use checksum::calculate_checksum;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{AppConfig, GuidelineSettings, PostgresSettings, RepositorySettings};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, GuidelineRepository, ReferenceRepository, RepositoryError,
    RepositoryResult, ScheduleRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository from a loaded configuration.
///
/// `REPOSITORY_TYPE` in the environment overrides the config file's
/// `[repository]` section. Calling this again after a successful init is a
/// no-op.
pub async fn init_repository(config: &AppConfig) -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let repo = if std::env::var("REPOSITORY_TYPE").is_ok() {
        RepositoryFactory::from_env().await
    } else {
        RepositoryFactory::from_app_config(config).await
    }
    .map_err(|e| anyhow::Error::msg(e.to_string()))
    .context("Failed to initialize repository")?;

    let _ = REPOSITORY.set(repo);
    get_repository()
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
