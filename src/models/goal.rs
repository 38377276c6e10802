//! Reading goal entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::juz::TOTAL_QURAN_PAGES;
use super::UserId;

crate::define_id_type!(i32, ReadingGoalId);

/// Default goal targets used when a user has no configuration yet.
pub const DEFAULT_DAILY_TARGET: i32 = 5;
pub const DEFAULT_WEEKLY_TARGET: i32 = 35;

/// A user's target configuration.
///
/// At most one goal per user is active at any time; activating a goal
/// deactivates all its siblings as part of the same repository operation.
/// Superseded goals are kept as history, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingGoal {
    pub id: ReadingGoalId,
    pub user_id: UserId,
    pub total_pages: i32,
    pub daily_target: i32,
    pub weekly_target: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a reading goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReadingGoal {
    pub user_id: UserId,
    #[serde(default = "default_total_pages")]
    pub total_pages: i32,
    #[serde(default = "default_daily_target")]
    pub daily_target: i32,
    #[serde(default = "default_weekly_target")]
    pub weekly_target: i32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_total_pages() -> i32 {
    TOTAL_QURAN_PAGES
}

fn default_daily_target() -> i32 {
    DEFAULT_DAILY_TARGET
}

fn default_weekly_target() -> i32 {
    DEFAULT_WEEKLY_TARGET
}

fn default_is_active() -> bool {
    true
}

/// Partial update applied to an existing goal. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReadingGoal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_target: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_target: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateReadingGoal {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(total_pages) = self.total_pages {
            if total_pages < 1 {
                return Err(format!("total_pages must be positive, got {}", total_pages));
            }
        }
        if let Some(daily_target) = self.daily_target {
            if daily_target < 1 {
                return Err(format!(
                    "daily_target must be positive, got {}",
                    daily_target
                ));
            }
        }
        if let Some(weekly_target) = self.weekly_target {
            if weekly_target < 1 {
                return Err(format!(
                    "weekly_target must be positive, got {}",
                    weekly_target
                ));
            }
        }
        Ok(())
    }

    /// Apply the present fields on top of an existing goal.
    pub fn apply_to(&self, goal: &mut ReadingGoal) {
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
    }
}

impl NewReadingGoal {
    /// The goal created for a user on first use.
    pub fn with_defaults(user_id: UserId) -> Self {
        Self {
            user_id,
            total_pages: default_total_pages(),
            daily_target: default_daily_target(),
            weekly_target: default_weekly_target(),
            is_active: default_is_active(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.total_pages < 1 {
            return Err(format!(
                "total_pages must be positive, got {}",
                self.total_pages
            ));
        }
        if self.daily_target < 1 {
            return Err(format!(
                "daily_target must be positive, got {}",
                self.daily_target
            ));
        }
        if self.weekly_target < 1 {
            return Err(format!(
                "weekly_target must be positive, got {}",
                self.weekly_target
            ));
        }
        Ok(())
    }
}
