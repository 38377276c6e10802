//! Reading log repository trait.
//!
//! This trait defines the storage operations for reading logs. Logs are
//! append-only: they are created once and only ever removed in bulk by
//! the clear-data operation.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{NewReadingLog, ReadingLog, UserId};

/// Repository trait for reading log storage.
///
/// Implementations return logs already ordered as documented per method;
/// the service layer relies on that ordering and never re-sorts, except
/// the progress engine which orders oldest-first internally.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ReadingLogRepository: Send + Sync {
    /// Append a new reading log.
    ///
    /// The input is assumed validated (`NewReadingLog::validate`); the
    /// repository assigns the id and creation timestamp.
    ///
    /// # Arguments
    /// * `new_log` - The log to store
    ///
    /// # Returns
    /// * `Ok(ReadingLog)` - The stored log with its assigned id
    /// * `Err(RepositoryError)` - If the operation fails
    async fn create_reading_log(&self, new_log: &NewReadingLog) -> RepositoryResult<ReadingLog>;

    /// Get the complete log history for a user, newest first
    /// (`date` descending, ties broken by `created_at` descending).
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    ///
    /// # Returns
    /// * `Ok(Vec<ReadingLog>)` - All logs for the user
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_reading_logs(&self, user_id: UserId) -> RepositoryResult<Vec<ReadingLog>>;

    /// Get the most recent logs for a user, newest first.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `limit` - Maximum number of logs to return
    ///
    /// # Returns
    /// * `Ok(Vec<ReadingLog>)` - Up to `limit` logs
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_recent_reading_logs(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> RepositoryResult<Vec<ReadingLog>>;

    /// Get logs whose date falls inside `[start_date, end_date]`, ordered
    /// by `date` ascending.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `start_date` - Inclusive lower bound
    /// * `end_date` - Inclusive upper bound
    ///
    /// # Returns
    /// * `Ok(Vec<ReadingLog>)` - Logs inside the range
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_reading_logs_in_range(
        &self,
        user_id: UserId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ReadingLog>>;

    /// Get logs whose declared `juz_number` matches, ordered by `date`
    /// descending.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `juz_number` - Declared juz number (1-30)
    ///
    /// # Returns
    /// * `Ok(Vec<ReadingLog>)` - Matching logs
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_reading_logs_by_juz(
        &self,
        user_id: UserId,
        juz_number: i32,
    ) -> RepositoryResult<Vec<ReadingLog>>;

    /// Delete every log belonging to a user.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of logs deleted
    /// * `Err(RepositoryError)` - If the operation fails
    async fn delete_reading_logs(&self, user_id: UserId) -> RepositoryResult<usize>;
}
