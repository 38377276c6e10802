//! Service layer tests driven against the in-memory repository.

use chrono::{Duration, NaiveDate, Utc};

use super::repositories::LocalRepository;
use super::repository::{GoalRepository, RepositoryError};
use super::services;
use crate::models::{NewReadingGoal, NewReadingLog, ReadingGoalId, UpdateReadingGoal, UserId};

const USER: UserId = UserId(1);

fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap()
}

#[tokio::test]
async fn test_health_check_passthrough() {
    let repo = LocalRepository::new();
    assert!(services::health_check(&repo).await.unwrap());

    repo.set_healthy(false);
    assert!(!services::health_check(&repo).await.unwrap());
}

#[tokio::test]
async fn test_create_log_rejects_out_of_range_juz() {
    let repo = LocalRepository::new();
    let new_log = NewReadingLog::new(USER, day(2025, 3, 10), 31, 5);

    let err = services::create_reading_log(&repo, &new_log)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(services::get_reading_logs(&repo, USER).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_log_persists_and_lists() {
    let repo = LocalRepository::new();
    let new_log = NewReadingLog::new(USER, day(2025, 3, 10), 2, 10);

    let created = services::create_reading_log(&repo, &new_log).await.unwrap();
    assert!(created.id.value() > 0);
    assert_eq!(created.juz_number, 2);

    let logs = services::get_reading_logs(&repo, USER).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, created.id);
}

#[tokio::test]
async fn test_recent_logs_limit_must_be_positive() {
    let repo = LocalRepository::new();

    let err = services::get_recent_reading_logs(&repo, USER, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_logs_by_juz_rejects_out_of_range() {
    let repo = LocalRepository::new();

    let err = services::get_reading_logs_by_juz(&repo, USER, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_logs_in_range_inverted_range_is_empty() {
    let repo = LocalRepository::new();
    let new_log = NewReadingLog::new(USER, day(2025, 3, 10), 1, 5);
    services::create_reading_log(&repo, &new_log).await.unwrap();

    let logs = services::get_reading_logs_in_range(&repo, USER, day(2025, 3, 11), day(2025, 3, 9))
        .await
        .unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_stats_reflect_created_logs() {
    let repo = LocalRepository::new();
    let today = Utc::now().date_naive();

    services::create_reading_log(&repo, &NewReadingLog::new(USER, today, 1, 5))
        .await
        .unwrap();
    services::create_reading_log(
        &repo,
        &NewReadingLog::new(USER, today - Duration::days(1), 1, 5),
    )
    .await
    .unwrap();

    let stats = services::get_reading_stats(&repo, USER).await.unwrap();
    assert_eq!(stats.total_pages_read, 10);
    assert_eq!(stats.total_khatmas, 0);
    assert_eq!(stats.longest_streak, 2);
}

#[tokio::test]
async fn test_juz_map_has_thirty_entries() {
    let repo = LocalRepository::new();
    services::create_reading_log(&repo, &NewReadingLog::new(USER, day(2025, 3, 10), 1, 21))
        .await
        .unwrap();

    let map = services::get_juz_map(&repo, USER).await.unwrap();
    assert_eq!(map.len(), 30);
    assert_eq!(map[0].pages_read, 21);
}

#[tokio::test]
async fn test_active_goal_progress_none_without_goal() {
    let repo = LocalRepository::new();

    let progress = services::get_active_goal_progress(&repo, USER).await.unwrap();
    assert!(progress.is_none());
}

#[tokio::test]
async fn test_active_goal_progress_percentages() {
    let repo = LocalRepository::new();
    services::create_reading_goal(&repo, &NewReadingGoal::with_defaults(USER))
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    services::create_reading_log(&repo, &NewReadingLog::new(USER, today, 1, 302))
        .await
        .unwrap();

    let progress = services::get_active_goal_progress(&repo, USER)
        .await
        .unwrap()
        .unwrap();
    // 302 of 604 pages overall, 302 against a weekly target of 35
    assert_eq!(progress.completion_percentage, 50);
    assert_eq!(progress.weekly_target_completion, 863);
    assert!(progress.goal.is_active);
}

#[tokio::test]
async fn test_create_goal_rejects_non_positive_targets() {
    let repo = LocalRepository::new();
    let mut new_goal = NewReadingGoal::with_defaults(USER);
    new_goal.daily_target = 0;

    let err = services::create_reading_goal(&repo, &new_goal)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_update_goal_validation_and_missing_id() {
    let repo = LocalRepository::new();

    let invalid = UpdateReadingGoal {
        weekly_target: Some(0),
        ..Default::default()
    };
    let err = services::update_reading_goal(&repo, ReadingGoalId(1), &invalid)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let valid = UpdateReadingGoal {
        daily_target: Some(10),
        ..Default::default()
    };
    let err = services::update_reading_goal(&repo, ReadingGoalId(99), &valid)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_initialize_default_data_is_idempotent() {
    let repo = LocalRepository::new();

    services::initialize_default_data(&repo, USER).await.unwrap();
    services::initialize_default_data(&repo, USER).await.unwrap();

    let goals = repo.get_reading_goals(USER).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].total_pages, 604);
    assert_eq!(goals[0].daily_target, 5);
    assert_eq!(goals[0].weekly_target, 35);
    assert!(goals[0].is_active);
}

#[tokio::test]
async fn test_clear_all_data_resets_goal_and_deletes_logs() {
    let repo = LocalRepository::new();

    let mut new_goal = NewReadingGoal::with_defaults(USER);
    new_goal.total_pages = 302;
    new_goal.daily_target = 10;
    let goal = services::create_reading_goal(&repo, &new_goal).await.unwrap();

    services::create_reading_log(&repo, &NewReadingLog::new(USER, day(2025, 3, 10), 1, 5))
        .await
        .unwrap();
    services::create_reading_log(&repo, &NewReadingLog::new(USER, day(2025, 3, 11), 1, 5))
        .await
        .unwrap();

    let deleted = services::clear_all_data(&repo, USER).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(services::get_reading_logs(&repo, USER).await.unwrap().is_empty());

    // The existing goal is reset in place, not replaced
    let goals = repo.get_reading_goals(USER).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, goal.id);
    assert_eq!(goals[0].total_pages, 604);
    assert_eq!(goals[0].daily_target, 10);
    assert!(goals[0].is_active);
}

#[tokio::test]
async fn test_clear_all_data_seeds_default_when_no_goal_exists() {
    let repo = LocalRepository::new();
    services::create_reading_log(&repo, &NewReadingLog::new(USER, day(2025, 3, 10), 1, 5))
        .await
        .unwrap();

    let deleted = services::clear_all_data(&repo, USER).await.unwrap();
    assert_eq!(deleted, 1);

    let goals = repo.get_reading_goals(USER).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].total_pages, 604);
}

#[tokio::test]
async fn test_clear_all_data_is_scoped_per_user() {
    let repo = LocalRepository::new();
    let other = UserId(2);

    services::create_reading_log(&repo, &NewReadingLog::new(USER, day(2025, 3, 10), 1, 5))
        .await
        .unwrap();
    services::create_reading_log(&repo, &NewReadingLog::new(other, day(2025, 3, 10), 1, 7))
        .await
        .unwrap();

    services::clear_all_data(&repo, USER).await.unwrap();

    assert!(services::get_reading_logs(&repo, USER).await.unwrap().is_empty());
    assert_eq!(services::get_reading_logs(&repo, other).await.unwrap().len(), 1);
}
