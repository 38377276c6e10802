//! Storage layer: repository traits, backends, and the service functions
//! built on top of them.
//!
//! The layering is strict. Handlers and the server binary call the service
//! functions in [`services`]; those validate input and derive progress, and
//! talk to storage only through the traits in [`repository`]. Two backends
//! implement the traits:
//!
//! ```text
//! HTTP handlers / server binary
//!         |
//! services (validation, derivation, seeding)
//!         |
//! repository traits (logs, goals, health)
//!         |
//! LocalRepository           PostgresRepository
//! (in-memory, RwLock)       (Diesel + r2d2 pool)
//! ```
//!
//! Pick a backend at runtime through [`factory`], or let the process-wide
//! singleton below do it from the environment:
//!
//! ```ignore
//! use khatma_rust::db::{self, services};
//! use khatma_rust::models::UserId;
//!
//! db::init_repository()?;
//! let repo = db::get_repository()?;
//! let stats = services::get_reading_stats(repo.as_ref(), UserId(1)).await?;
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;

// Postgres config is colocated with the repository implementation. The
// stubs keep signatures like `Option<&PostgresConfig>` spellable in builds
// without the feature; they carry no data and cannot be constructed outside
// this crate.
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

// Service layer, the surface most callers want.
pub use services::{
    clear_all_data, create_reading_goal, create_reading_log, get_active_goal_progress,
    get_juz_map, get_reading_logs, get_reading_logs_by_juz, get_reading_logs_in_range,
    get_reading_stats, get_recent_reading_logs, health_check, initialize_default_data,
    update_reading_goal, DEFAULT_RECENT_LOG_LIMIT,
};

// Repository abstractions for callers that wire storage themselves.
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, GoalRepository, HealthCheckRepository, ReadingLogRepository,
    RepositoryError, RepositoryResult,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};
#[cfg(feature = "postgres-repo")]
use tokio::runtime::Runtime;

/// Process-wide repository, set once by [`init_repository`].
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository for the selected backend. Idempotent;
/// concurrent callers race safely and the first stored instance wins.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = connect_selected_backend()?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

// Postgres wins when both backend features are compiled in.
#[cfg(feature = "postgres-repo")]
fn connect_selected_backend() -> Result<Arc<dyn FullRepository>> {
    let config =
        PostgresConfig::from_env().map_err(|e| anyhow::anyhow!("Postgres settings: {}", e))?;

    // This runs from sync startup paths, so bridge into async for the pool
    // and migrations.
    let runtime = Runtime::new().context("Failed to start async runtime for repository setup")?;
    let repo = runtime
        .block_on(RepositoryFactory::create_postgres(&config))
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    Ok(repo as Arc<dyn FullRepository>)
}

#[cfg(all(feature = "local-repo", not(feature = "postgres-repo")))]
fn connect_selected_backend() -> Result<Arc<dyn FullRepository>> {
    Ok(RepositoryFactory::create_local())
}

/// The global repository, initializing it on first use if needed.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
