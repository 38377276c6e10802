//! Streak and consistency computations over the reading history.
//!
//! All functions here are pure: they take a snapshot of the log history plus
//! a reference date and return plain numbers, so every storage backend and
//! every caller derives identical results from identical data.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::ReadingLog;

/// Window used for the consistency figure in the aggregate stats.
pub const DEFAULT_CONSISTENCY_WINDOW_DAYS: i32 = 30;

/// Bound on the backward walk so the streak scan always terminates.
const MAX_STREAK_LOOKBACK_DAYS: i64 = 366;

fn reading_dates(logs: &[ReadingLog]) -> BTreeSet<NaiveDate> {
    logs.iter().map(|log| log.date).collect()
}

/// Consecutive calendar days ending `today` with at least one log.
///
/// The walk starts at `today`, so a day without an entry yields 0 no matter
/// how long the run before it was.
pub fn current_streak(logs: &[ReadingLog], today: NaiveDate) -> i32 {
    let dates = reading_dates(logs);
    if dates.is_empty() {
        return 0;
    }

    let mut streak = 0;
    for offset in 0..MAX_STREAK_LOOKBACK_DAYS {
        let day = today - Duration::days(offset);
        if dates.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of consecutive reading days anywhere in the history.
///
/// Returns at least 1 when any log exists, 0 for an empty history.
pub fn longest_streak(logs: &[ReadingLog]) -> i32 {
    let dates = reading_dates(logs);
    if dates.is_empty() {
        return 0;
    }

    let mut longest = 0;
    let mut current = 1;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        if let Some(prev) = prev {
            if (date - prev).num_days() == 1 {
                current += 1;
            } else {
                longest = longest.max(current);
                current = 1;
            }
        }
        prev = Some(date);
    }
    longest.max(current)
}

/// Percentage of days with at least one log in the trailing window
/// `[today - days + 1, today]`.
///
/// Unique reading days never exceed the window size, so the result is
/// always within 0..=100. A non-positive window yields 0.
pub fn consistency_percentage(logs: &[ReadingLog], days: i32, today: NaiveDate) -> i32 {
    if days <= 0 {
        return 0;
    }

    let window_start = today - Duration::days(days as i64 - 1);
    let unique_days = logs
        .iter()
        .map(|log| log.date)
        .filter(|date| *date >= window_start && *date <= today)
        .collect::<BTreeSet<_>>()
        .len();

    ((unique_days as f64 / days as f64) * 100.0).round() as i32
}

/// First day (Sunday) of the week containing `today`.
pub fn start_of_week(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_sunday() as i64)
}
