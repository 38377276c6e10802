//! In-memory storage backend.
//!
//! Rows live in `HashMap`s behind a single `RwLock`, ids come from plain
//! counters, and nothing survives the process. That makes this backend the
//! right default for unit tests and for running the server without a
//! database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;

use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::db::repository::{GoalRepository, HealthCheckRepository, ReadingLogRepository};
use crate::models::{
    NewReadingGoal, NewReadingLog, ReadingGoal, ReadingGoalId, ReadingLog, ReadingLogId,
    UpdateReadingGoal, UserId,
};

/// In-memory repository handle. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    logs: HashMap<ReadingLogId, ReadingLog>,
    goals: HashMap<ReadingGoalId, ReadingGoal>,

    // ID counters
    next_log_id: i32,
    next_goal_id: i32,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            logs: HashMap::new(),
            goals: HashMap::new(),
            next_log_id: 1,
            next_goal_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of logs stored, across all users.
    pub fn log_count(&self) -> usize {
        self.data.read().logs.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }

    /// Collect a user's logs sorted newest first.
    fn logs_newest_first(&self, user_id: UserId) -> Vec<ReadingLog> {
        let data = self.data.read();
        let mut logs: Vec<ReadingLog> = data
            .logs
            .values()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        logs
    }

    /// Deactivate every goal a user owns. Caller holds the write lock.
    fn deactivate_goals(data: &mut LocalData, user_id: UserId) {
        for goal in data.goals.values_mut() {
            if goal.user_id == user_id {
                goal.is_active = false;
            }
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingLogRepository for LocalRepository {
    async fn create_reading_log(&self, new_log: &NewReadingLog) -> RepositoryResult<ReadingLog> {
        self.check_health()?;

        let mut data = self.data.write();
        let id = ReadingLogId(data.next_log_id);
        data.next_log_id += 1;

        let log = ReadingLog {
            id,
            user_id: new_log.user_id,
            date: new_log.date,
            juz_number: new_log.juz_number,
            pages_read: new_log.pages_read,
            start_page: new_log.start_page,
            end_page: new_log.end_page,
            created_at: Utc::now(),
        };
        data.logs.insert(id, log.clone());

        Ok(log)
    }

    async fn get_reading_logs(&self, user_id: UserId) -> RepositoryResult<Vec<ReadingLog>> {
        Ok(self.logs_newest_first(user_id))
    }

    async fn get_recent_reading_logs(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> RepositoryResult<Vec<ReadingLog>> {
        let mut logs = self.logs_newest_first(user_id);
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn get_reading_logs_in_range(
        &self,
        user_id: UserId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ReadingLog>> {
        let data = self.data.read();
        let mut logs: Vec<ReadingLog> = data
            .logs
            .values()
            .filter(|log| {
                log.user_id == user_id && log.date >= start_date && log.date <= end_date
            })
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(logs)
    }

    async fn get_reading_logs_by_juz(
        &self,
        user_id: UserId,
        juz_number: i32,
    ) -> RepositoryResult<Vec<ReadingLog>> {
        let mut logs = self.logs_newest_first(user_id);
        logs.retain(|log| log.juz_number == juz_number);
        Ok(logs)
    }

    async fn delete_reading_logs(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.check_health()?;

        let mut data = self.data.write();
        let before = data.logs.len();
        data.logs.retain(|_, log| log.user_id != user_id);
        Ok(before - data.logs.len())
    }
}

#[async_trait]
impl GoalRepository for LocalRepository {
    async fn get_active_reading_goal(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<ReadingGoal>> {
        let data = self.data.read();
        Ok(data
            .goals
            .values()
            .find(|goal| goal.user_id == user_id && goal.is_active)
            .cloned())
    }

    async fn get_reading_goals(&self, user_id: UserId) -> RepositoryResult<Vec<ReadingGoal>> {
        let data = self.data.read();
        let mut goals: Vec<ReadingGoal> = data
            .goals
            .values()
            .filter(|goal| goal.user_id == user_id)
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(goals)
    }

    async fn create_reading_goal(
        &self,
        new_goal: &NewReadingGoal,
    ) -> RepositoryResult<ReadingGoal> {
        self.check_health()?;

        let mut data = self.data.write();
        if new_goal.is_active {
            Self::deactivate_goals(&mut data, new_goal.user_id);
        }

        let id = ReadingGoalId(data.next_goal_id);
        data.next_goal_id += 1;

        let goal = ReadingGoal {
            id,
            user_id: new_goal.user_id,
            total_pages: new_goal.total_pages,
            daily_target: new_goal.daily_target,
            weekly_target: new_goal.weekly_target,
            is_active: new_goal.is_active,
            created_at: Utc::now(),
        };
        data.goals.insert(id, goal.clone());

        Ok(goal)
    }

    async fn update_reading_goal(
        &self,
        goal_id: ReadingGoalId,
        changes: &UpdateReadingGoal,
    ) -> RepositoryResult<ReadingGoal> {
        self.check_health()?;

        let mut data = self.data.write();
        let mut goal = data
            .goals
            .get(&goal_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Reading goal {} not found", goal_id))
            })?;

        changes.apply_to(&mut goal);
        if goal.is_active {
            Self::deactivate_goals(&mut data, goal.user_id);
        }
        data.goals.insert(goal_id, goal.clone());

        Ok(goal)
    }
}

#[async_trait]
impl HealthCheckRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read();
        Ok(data.is_healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewReadingLog;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unhealthy_repository_rejects_writes() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let new_log = NewReadingLog::new(UserId(1), date(2025, 6, 1), 1, 5);
        let result = repo.create_reading_log(&new_log).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConnectionError { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_and_list_logs_newest_first() {
        let repo = LocalRepository::new();
        let user = UserId(1);

        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 1), 1, 5))
            .await
            .unwrap();
        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 3), 2, 7))
            .await
            .unwrap();
        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 2), 3, 4))
            .await
            .unwrap();

        let logs = repo.get_reading_logs(user).await.unwrap();
        let dates: Vec<NaiveDate> = logs.iter().map(|log| log.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 6, 3), date(2025, 6, 2), date(2025, 6, 1)]
        );
    }

    #[tokio::test]
    async fn test_logs_are_scoped_per_user() {
        let repo = LocalRepository::new();
        repo.create_reading_log(&NewReadingLog::new(UserId(1), date(2025, 6, 1), 1, 5))
            .await
            .unwrap();
        repo.create_reading_log(&NewReadingLog::new(UserId(2), date(2025, 6, 1), 1, 9))
            .await
            .unwrap();

        let logs = repo.get_reading_logs(UserId(1)).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, 5);
    }

    #[tokio::test]
    async fn test_recent_logs_respects_limit() {
        let repo = LocalRepository::new();
        let user = UserId(1);
        for d in 1..=8 {
            repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, d), 1, 3))
                .await
                .unwrap();
        }

        let logs = repo.get_recent_reading_logs(user, 5).await.unwrap();
        assert_eq!(logs.len(), 5);
        assert_eq!(logs[0].date, date(2025, 6, 8));
        assert_eq!(logs[4].date, date(2025, 6, 4));
    }

    #[tokio::test]
    async fn test_range_query_is_inclusive_and_ascending() {
        let repo = LocalRepository::new();
        let user = UserId(1);
        for d in 1..=5 {
            repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, d), 1, 3))
                .await
                .unwrap();
        }

        let logs = repo
            .get_reading_logs_in_range(user, date(2025, 6, 2), date(2025, 6, 4))
            .await
            .unwrap();
        let dates: Vec<NaiveDate> = logs.iter().map(|log| log.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 6, 2), date(2025, 6, 3), date(2025, 6, 4)]
        );
    }

    #[tokio::test]
    async fn test_logs_by_juz_filters_on_declared_number() {
        let repo = LocalRepository::new();
        let user = UserId(1);
        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 1), 1, 5))
            .await
            .unwrap();
        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 2), 2, 5))
            .await
            .unwrap();
        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 3), 1, 5))
            .await
            .unwrap();

        let logs = repo.get_reading_logs_by_juz(user, 1).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].date, date(2025, 6, 3));
        assert_eq!(logs[1].date, date(2025, 6, 1));
    }

    #[tokio::test]
    async fn test_delete_reading_logs_returns_count() {
        let repo = LocalRepository::new();
        let user = UserId(1);
        for d in 1..=3 {
            repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, d), 1, 3))
                .await
                .unwrap();
        }
        repo.create_reading_log(&NewReadingLog::new(UserId(2), date(2025, 6, 1), 1, 3))
            .await
            .unwrap();

        assert_eq!(repo.delete_reading_logs(user).await.unwrap(), 3);
        assert!(repo.get_reading_logs(user).await.unwrap().is_empty());
        assert_eq!(repo.get_reading_logs(UserId(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_goal_deactivates_siblings() {
        let repo = LocalRepository::new();
        let user = UserId(1);

        let first = repo
            .create_reading_goal(&NewReadingGoal::with_defaults(user))
            .await
            .unwrap();
        assert!(first.is_active);

        let second = repo
            .create_reading_goal(&NewReadingGoal {
                daily_target: 10,
                ..NewReadingGoal::with_defaults(user)
            })
            .await
            .unwrap();
        assert!(second.is_active);

        let active = repo.get_active_reading_goal(user).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);

        let goals = repo.get_reading_goals(user).await.unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals.iter().filter(|g| g.is_active).count(), 1);
    }

    #[tokio::test]
    async fn test_update_goal_activation_is_exclusive() {
        let repo = LocalRepository::new();
        let user = UserId(1);

        let first = repo
            .create_reading_goal(&NewReadingGoal::with_defaults(user))
            .await
            .unwrap();
        let second = repo
            .create_reading_goal(&NewReadingGoal::with_defaults(user))
            .await
            .unwrap();
        assert_eq!(
            repo.get_active_reading_goal(user).await.unwrap().unwrap().id,
            second.id
        );

        let updated = repo
            .update_reading_goal(
                first.id,
                &UpdateReadingGoal {
                    is_active: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_active);

        let goals = repo.get_reading_goals(user).await.unwrap();
        assert_eq!(goals.iter().filter(|g| g.is_active).count(), 1);
        assert_eq!(
            repo.get_active_reading_goal(user).await.unwrap().unwrap().id,
            first.id
        );
    }

    #[tokio::test]
    async fn test_update_goal_partial_fields() {
        let repo = LocalRepository::new();
        let goal = repo
            .create_reading_goal(&NewReadingGoal::with_defaults(UserId(1)))
            .await
            .unwrap();

        let updated = repo
            .update_reading_goal(
                goal.id,
                &UpdateReadingGoal {
                    weekly_target: Some(70),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.weekly_target, 70);
        assert_eq!(updated.daily_target, goal.daily_target);
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_goal_is_not_found() {
        let repo = LocalRepository::new();
        let result = repo
            .update_reading_goal(ReadingGoalId(999), &UpdateReadingGoal::default())
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_clear_resets_ids() {
        let repo = LocalRepository::new();
        let user = UserId(1);
        repo.create_reading_log(&NewReadingLog::new(user, date(2025, 6, 1), 1, 5))
            .await
            .unwrap();
        repo.clear();
        assert_eq!(repo.log_count(), 0);

        let log = repo
            .create_reading_log(&NewReadingLog::new(user, date(2025, 6, 2), 1, 5))
            .await
            .unwrap();
        assert_eq!(log.id, ReadingLogId(1));
    }
}
