//! Storage abstraction split into capability traits.
//!
//! Rather than one wide trait, each storage concern gets its own:
//!
//! - [`logs`] stores reading sessions
//! - [`goals`] stores goals and enforces the single-active rule
//! - [`health`] probes backend liveness
//! - [`error`] holds the shared error and result types
//!
//! Backends implement the three traits separately. Callers that need the
//! whole surface bound on [`FullRepository`] instead, which the blanket
//! impl below grants to any complete backend:
//!
//! ```ignore
//! async fn weekly_summary<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let logs = repo.get_reading_logs(user_id).await?;
//!     let goal = repo.get_active_reading_goal(user_id).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod goals;
pub mod health;
pub mod logs;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use goals::GoalRepository;
pub use health::HealthCheckRepository;
pub use logs::ReadingLogRepository;

/// Everything a backend must provide, as a single bound.
pub trait FullRepository: ReadingLogRepository + GoalRepository + HealthCheckRepository {}

impl<T> FullRepository for T where T: ReadingLogRepository + GoalRepository + HealthCheckRepository {}
