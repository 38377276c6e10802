//! Reading goal repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewReadingGoal, ReadingGoal, ReadingGoalId, UpdateReadingGoal, UserId};

/// Repository trait for reading goal storage.
///
/// Goals carry an at-most-one-active invariant per user. Implementations
/// enforce it inside `create_reading_goal` and `update_reading_goal`:
/// storing an active goal deactivates every sibling in the same
/// repository-level state transition (one lock scope in memory, one
/// transaction on Postgres).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Get the active goal for a user, if any.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    ///
    /// # Returns
    /// * `Ok(Some(ReadingGoal))` - The active goal
    /// * `Ok(None)` - The user has no active goal
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_active_reading_goal(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<ReadingGoal>>;

    /// Get every goal for a user, newest first.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    ///
    /// # Returns
    /// * `Ok(Vec<ReadingGoal>)` - All goals, active or not
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_reading_goals(&self, user_id: UserId) -> RepositoryResult<Vec<ReadingGoal>>;

    /// Store a new goal. If it is active, siblings are deactivated
    /// atomically.
    ///
    /// # Arguments
    /// * `new_goal` - The goal to store, assumed validated
    ///
    /// # Returns
    /// * `Ok(ReadingGoal)` - The stored goal with its assigned id
    /// * `Err(RepositoryError)` - If the operation fails
    async fn create_reading_goal(&self, new_goal: &NewReadingGoal)
        -> RepositoryResult<ReadingGoal>;

    /// Apply a partial update to an existing goal. If the update activates
    /// the goal, siblings are deactivated atomically.
    ///
    /// # Arguments
    /// * `goal_id` - The goal to update
    /// * `changes` - Fields to change, assumed validated
    ///
    /// # Returns
    /// * `Ok(ReadingGoal)` - The updated goal
    /// * `Err(RepositoryError::NotFound)` - If the goal doesn't exist
    /// * `Err(RepositoryError)` - If the operation fails
    async fn update_reading_goal(
        &self,
        goal_id: ReadingGoalId,
        changes: &UpdateReadingGoal,
    ) -> RepositoryResult<ReadingGoal>;
}
