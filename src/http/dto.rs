//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Domain types that already derive Serialize/Deserialize are re-exported
//! and used directly as response bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Re-export existing types that are already serializable
pub use crate::models::{
    GoalProgress, JuzMapItem, ReadingGoal, ReadingLog, ReadingStats, UpdateReadingGoal,
};

use crate::models::{NewReadingGoal, NewReadingLog, UserId};

/// Query parameters common to user-scoped endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserQuery {
    /// User to operate on (defaults to the server's default user)
    #[serde(default)]
    pub user_id: Option<i32>,
}

/// Query parameters for the recent-logs endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecentLogsQuery {
    /// User to operate on (defaults to the server's default user)
    #[serde(default)]
    pub user_id: Option<i32>,
    /// Maximum number of logs to return (default: 5)
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query parameters for the date-range endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeQuery {
    /// User to operate on (defaults to the server's default user)
    #[serde(default)]
    pub user_id: Option<i32>,
    /// First date of the range (inclusive), `YYYY-MM-DD`
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive), `YYYY-MM-DD`
    pub end_date: NaiveDate,
}

/// Request body for recording a reading session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReadingLogRequest {
    /// Calendar date of the session, `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Juz the session belongs to (1-30)
    pub juz_number: i32,
    /// Pages read in the session
    pub pages_read: i32,
    /// Explicit start page (optional)
    #[serde(default)]
    pub start_page: Option<i32>,
    /// Explicit end page (optional)
    #[serde(default)]
    pub end_page: Option<i32>,
}

impl CreateReadingLogRequest {
    /// Attach the resolved user to build the storage-ready log.
    pub fn into_new_log(self, user_id: UserId) -> NewReadingLog {
        NewReadingLog {
            user_id,
            date: self.date,
            juz_number: self.juz_number,
            pages_read: self.pages_read,
            start_page: self.start_page,
            end_page: self.end_page,
        }
    }
}

/// Request body for creating a reading goal.
///
/// Absent fields fall back to the standard defaults (604 pages, 5 per day,
/// 35 per week, active).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateReadingGoalRequest {
    #[serde(default)]
    pub total_pages: Option<i32>,
    #[serde(default)]
    pub daily_target: Option<i32>,
    #[serde(default)]
    pub weekly_target: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl CreateReadingGoalRequest {
    /// Attach the resolved user to build the storage-ready goal.
    pub fn into_new_goal(self, user_id: UserId) -> NewReadingGoal {
        let mut goal = NewReadingGoal::with_defaults(user_id);
        if let Some(total_pages) = self.total_pages {
            goal.total_pages = total_pages;
        }
        if let Some(daily_target) = self.daily_target {
            goal.daily_target = daily_target;
        }
        if let Some(weekly_target) = self.weekly_target {
            goal.weekly_target = weekly_target;
        }
        if let Some(is_active) = self.is_active {
            goal.is_active = is_active;
        }
        goal
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Reading log list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingLogListResponse {
    /// List of reading logs
    pub logs: Vec<ReadingLog>,
    /// Total count
    pub total: usize,
}

/// Juz completion map response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JuzMapResponse {
    /// One entry per juz, 1 through 30
    pub juz_map: Vec<JuzMapItem>,
}

/// Clear-data confirmation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearDataResponse {
    /// Message about the operation
    pub message: String,
    /// Number of reading logs removed
    pub deleted_logs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_log_request_carries_user() {
        let request: CreateReadingLogRequest =
            serde_json::from_str(r#"{"date": "2025-03-10", "juz_number": 2, "pages_read": 10}"#)
                .unwrap();
        let new_log = request.into_new_log(UserId(7));

        assert_eq!(new_log.user_id, UserId(7));
        assert_eq!(new_log.juz_number, 2);
        assert_eq!(new_log.start_page, None);
    }

    #[test]
    fn test_create_goal_request_fills_defaults() {
        let request: CreateReadingGoalRequest =
            serde_json::from_str(r#"{"daily_target": 10}"#).unwrap();
        let new_goal = request.into_new_goal(UserId(1));

        assert_eq!(new_goal.daily_target, 10);
        assert_eq!(new_goal.total_pages, 604);
        assert_eq!(new_goal.weekly_target, 35);
        assert!(new_goal.is_active);
    }
}
