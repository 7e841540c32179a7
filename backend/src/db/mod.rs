//! Storage for the roster.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / binaries                                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service layer (crate::services)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │ LocalRepository  │ Postgres  │
//!     └──────────────────────────────┘
//! ```
//!
//! - `repository`: trait definitions and [`RepositoryError`]
//! - `repositories::local`: in-memory implementation for tests and development
//! - `repositories::postgres`: Diesel implementation (feature `postgres-repo`)
//! - `factory`: backend selection
//! - `repo_config`: `repository.toml`
//!
//! ```ignore
//! use shift_roster::db::{RepositoryFactory, RosterConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RosterConfig::load()?;
//!     let repo = RepositoryFactory::from_config(&config).await?;
//!     let shifts = repo.list_shift_definitions().await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RosterConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AssignmentRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    SeriesRepository, ShiftRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Process-wide repository, set once by [`init_repository`].
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Build the repository described by `config` and install it globally.
///
/// A second call keeps the first repository.
pub async fn init_repository(config: &RosterConfig) -> Result<Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(Arc::clone(repo));
    }

    let repo = RepositoryFactory::from_config(config)
        .await
        .context("Failed to create repository")?;
    let _ = REPOSITORY.set(Arc::clone(&repo));
    Ok(Arc::clone(REPOSITORY.get().unwrap_or(&repo)))
}

/// The repository installed by [`init_repository`].
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
