//! Derived statistics view types.
//!
//! Everything here is computed fresh from the log history on each query and
//! never persisted.

use serde::{Deserialize, Serialize};

use super::ReadingGoal;

/// Completion state of a juz within the current khatma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JuzStatus {
    Completed,
    Partial,
    NotStarted,
}

/// Per-juz completion entry of the current khatma map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuzMapItem {
    pub juz_number: i32,
    pub status: JuzStatus,
    /// Pages of this juz attributed to the current khatma.
    pub pages_read: i32,
    /// Size of the juz.
    pub total_pages: i32,
    pub percent_complete: i32,
}

/// Aggregate reading statistics for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingStats {
    /// Sum of pages over the whole history; khatma completion never resets it.
    pub total_pages_read: i64,
    pub total_khatmas: i64,
    /// Juz completed within the current khatma.
    pub completed_juz: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Percentage of days with a reading in the trailing 30-day window.
    pub consistency: i32,
}

/// Active goal enriched with progress percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: ReadingGoal,
    /// Whole-history pages against the goal's total.
    pub completion_percentage: i32,
    /// Pages read since the start of the week (Sunday) against the weekly target.
    pub weekly_target_completion: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_juz_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&JuzStatus::NotStarted).unwrap(),
            "\"not-started\""
        );
        assert_eq!(
            serde_json::to_string(&JuzStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&JuzStatus::Partial).unwrap(),
            "\"partial\""
        );
    }
}
