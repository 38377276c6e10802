//! High-level database service layer.
//!
//! This module provides repository-agnostic operations that work with any
//! implementation of the repository traits. These functions contain business
//! logic such as input validation, progress derivation, and default data
//! seeding that should be consistent regardless of the storage backend.
//!
//! # Architecture
//!
//! The database module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP handlers, server binary)        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic            │
//! │  - Input validation                                      │
//! │  - Progress / streak derivation orchestration            │
//! │  - Default data seeding                                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! │  - ReadingLogRepository (log queries and writes)         │
//! │  - GoalRepository (goal management)                      │
//! │  - HealthCheckRepository (connectivity)                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Postgres         │     │ Local Repository        │
//! │ Repository       │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use khatma_rust::db::{services, repositories::LocalRepository};
//! use khatma_rust::models::UserId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create local repository
//!     let repo = LocalRepository::new();
//!
//!     // Use service layer functions
//!     let stats = services::get_reading_stats(&repo, UserId(1)).await?;
//!     println!("{} pages read so far", stats.total_pages_read);
//!
//!     Ok(())
//! }
//! ```

use chrono::{NaiveDate, Utc};
use log::info;

use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    GoalProgress, JuzMapItem, NewReadingGoal, NewReadingLog, ReadingGoal, ReadingGoalId,
    ReadingLog, ReadingStats, UpdateReadingGoal, UserId, TOTAL_JUZ, TOTAL_QURAN_PAGES,
};
use crate::services::{
    completion_percentage, juz_map, reading_stats, start_of_week, total_pages_read,
    weekly_target_completion,
};

/// Number of logs returned by the recent-logs query when no limit is given.
pub const DEFAULT_RECENT_LOG_LIMIT: i64 = 5;

// ==================== Health & Connection ====================

/// Check if the storage backend is reachable.
///
/// This is a simple pass-through to the repository's health check.
///
/// # Arguments
/// * `repo` - Repository implementation
///
/// # Returns
/// * `Ok(true)` if the connection is healthy
/// * `Err` if the check fails
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Reading Log Operations ====================

/// Record a reading session.
///
/// Input is validated before it reaches storage: the juz number must be in
/// range, pages read positive, and explicit page bounds within 1..=604.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `new_log` - The session to record
///
/// # Returns
/// * `Ok(ReadingLog)` - The persisted log with its assigned id
/// * `Err(RepositoryError::ValidationError)` if a field is out of range
/// * `Err` if storage fails
pub async fn create_reading_log<R: FullRepository + ?Sized>(
    repo: &R,
    new_log: &NewReadingLog,
) -> RepositoryResult<ReadingLog> {
    new_log.validate().map_err(RepositoryError::validation)?;

    info!(
        "Service layer: recording reading log for user {} (juz {}, {} pages on {})",
        new_log.user_id, new_log.juz_number, new_log.pages_read, new_log.date
    );
    repo.create_reading_log(new_log).await
}

/// List every reading log of a user, newest first.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the logs
///
/// # Returns
/// * `Ok(Vec<ReadingLog>)` ordered by date, then creation time, descending
/// * `Err` if the query fails
pub async fn get_reading_logs<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<Vec<ReadingLog>> {
    info!("Service layer: listing reading logs for user {}", user_id);
    repo.get_reading_logs(user_id).await
}

/// The most recent reading logs of a user.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the logs
/// * `limit` - Maximum number of logs to return, must be at least 1
///
/// # Returns
/// * `Ok(Vec<ReadingLog>)` with at most `limit` entries, newest first
/// * `Err(RepositoryError::ValidationError)` if `limit` is not positive
pub async fn get_recent_reading_logs<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
    limit: i64,
) -> RepositoryResult<Vec<ReadingLog>> {
    if limit < 1 {
        return Err(RepositoryError::validation(format!(
            "limit must be at least 1, got {}",
            limit
        )));
    }
    repo.get_recent_reading_logs(user_id, limit).await
}

/// Reading logs within an inclusive date range, oldest first.
///
/// An inverted range (start after end) matches nothing and yields an empty
/// list.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the logs
/// * `start_date` - First date of the range (inclusive)
/// * `end_date` - Last date of the range (inclusive)
///
/// # Returns
/// * `Ok(Vec<ReadingLog>)` ordered by date ascending
/// * `Err` if the query fails
pub async fn get_reading_logs_in_range<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> RepositoryResult<Vec<ReadingLog>> {
    repo.get_reading_logs_in_range(user_id, start_date, end_date)
        .await
}

/// Reading logs whose declared juz matches, newest first.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the logs
/// * `juz_number` - Declared juz, 1 through 30
///
/// # Returns
/// * `Ok(Vec<ReadingLog>)` ordered by date descending
/// * `Err(RepositoryError::ValidationError)` if the juz number is out of range
pub async fn get_reading_logs_by_juz<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
    juz_number: i32,
) -> RepositoryResult<Vec<ReadingLog>> {
    if !(1..=TOTAL_JUZ).contains(&juz_number) {
        return Err(RepositoryError::validation(format!(
            "juz_number must be between 1 and {}, got {}",
            TOTAL_JUZ, juz_number
        )));
    }
    repo.get_reading_logs_by_juz(user_id, juz_number).await
}

// ==================== Progress & Statistics ====================

/// Aggregate reading statistics for a user.
///
/// Fetches the full log history and derives totals, khatma count, completed
/// juz of the current khatma, streaks, and the trailing 30-day consistency.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the logs
///
/// # Returns
/// * `Ok(ReadingStats)` - Derived statistics, all zero for an empty history
/// * `Err` if the query fails
pub async fn get_reading_stats<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<ReadingStats> {
    info!("Service layer: computing reading stats for user {}", user_id);
    let logs = repo.get_reading_logs(user_id).await?;
    Ok(reading_stats(&logs, Utc::now().date_naive()))
}

/// Per-juz completion map of the user's current khatma.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the logs
///
/// # Returns
/// * `Ok(Vec<JuzMapItem>)` - Exactly 30 entries, juz 1 through 30
/// * `Err` if the query fails
pub async fn get_juz_map<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<Vec<JuzMapItem>> {
    let logs = repo.get_reading_logs(user_id).await?;
    Ok(juz_map(&logs))
}

// ==================== Goal Operations ====================

/// The user's active goal enriched with progress percentages.
///
/// Completion is measured over the whole history; the weekly figure sums
/// pages since the start of the week (Sunday).
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the goal
///
/// # Returns
/// * `Ok(Some(GoalProgress))` when an active goal exists
/// * `Ok(None)` when the user has no active goal
/// * `Err` if a query fails
pub async fn get_active_goal_progress<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<Option<GoalProgress>> {
    let goal = match repo.get_active_reading_goal(user_id).await? {
        Some(goal) => goal,
        None => return Ok(None),
    };

    let logs = repo.get_reading_logs(user_id).await?;
    let total = total_pages_read(&logs);

    let today = Utc::now().date_naive();
    let week_start = start_of_week(today);
    let week_logs = repo
        .get_reading_logs_in_range(user_id, week_start, today)
        .await?;
    let pages_this_week = total_pages_read(&week_logs);

    Ok(Some(GoalProgress {
        completion_percentage: completion_percentage(total, goal.total_pages),
        weekly_target_completion: weekly_target_completion(pages_this_week, goal.weekly_target),
        goal,
    }))
}

/// Create a reading goal.
///
/// An active goal supersedes every other goal of the user; the repository
/// deactivates siblings in the same operation.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `new_goal` - The goal to create
///
/// # Returns
/// * `Ok(ReadingGoal)` - The persisted goal with its assigned id
/// * `Err(RepositoryError::ValidationError)` if a target is not positive
pub async fn create_reading_goal<R: FullRepository + ?Sized>(
    repo: &R,
    new_goal: &NewReadingGoal,
) -> RepositoryResult<ReadingGoal> {
    new_goal.validate().map_err(RepositoryError::validation)?;

    info!(
        "Service layer: creating reading goal for user {} (total {}, daily {}, weekly {})",
        new_goal.user_id, new_goal.total_pages, new_goal.daily_target, new_goal.weekly_target
    );
    repo.create_reading_goal(new_goal).await
}

/// Apply a partial update to an existing goal.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `goal_id` - Goal to update
/// * `changes` - Fields to change; absent fields keep their current value
///
/// # Returns
/// * `Ok(ReadingGoal)` - The updated goal
/// * `Err(RepositoryError::NotFound)` if no goal has that id
/// * `Err(RepositoryError::ValidationError)` if a present field is invalid
pub async fn update_reading_goal<R: FullRepository + ?Sized>(
    repo: &R,
    goal_id: ReadingGoalId,
    changes: &UpdateReadingGoal,
) -> RepositoryResult<ReadingGoal> {
    changes.validate().map_err(RepositoryError::validation)?;

    info!("Service layer: updating reading goal {}", goal_id);
    repo.update_reading_goal(goal_id, changes).await
}

// ==================== Data Management ====================

/// Ensure a user has at least one goal, creating the default if not.
///
/// The default goal targets the full 604 pages with 5 pages per day and
/// 35 per week.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - User to seed
///
/// # Returns
/// * `Ok(())` once a goal exists
/// * `Err` if a query fails
pub async fn initialize_default_data<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<()> {
    let goals = repo.get_reading_goals(user_id).await?;
    if goals.is_empty() {
        info!(
            "Service layer: seeding default reading goal for user {}",
            user_id
        );
        repo.create_reading_goal(&NewReadingGoal::with_defaults(user_id))
            .await?;
    }
    Ok(())
}

/// Wipe a user's reading history and reset their goal configuration.
///
/// Deletes all logs, resets an existing active goal back to the full
/// 604-page total (targets and active flag are kept), and ensures default
/// data afterwards.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - User to clear
///
/// # Returns
/// * `Ok(usize)` - Number of logs deleted
/// * `Err` if any step fails
pub async fn clear_all_data<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<usize> {
    info!("Service layer: clearing all data for user {}", user_id);
    let deleted = repo.delete_reading_logs(user_id).await?;
    info!(
        "Service layer: deleted {} reading logs for user {}",
        deleted, user_id
    );

    if let Some(goal) = repo.get_active_reading_goal(user_id).await? {
        let reset = UpdateReadingGoal {
            total_pages: Some(TOTAL_QURAN_PAGES),
            ..Default::default()
        };
        repo.update_reading_goal(goal.id, &reset).await?;
    }

    initialize_default_data(repo, user_id).await?;

    Ok(deleted)
}
