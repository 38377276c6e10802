//! Khatma and per-juz progress derivation.
//!
//! The whole history of reading logs is reduced to three figures: total
//! pages read, completed khatma count, and a 30-entry completion map for the
//! khatma currently in progress. The functions are pure and recompute from
//! scratch on every call; there is no cached aggregation state.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::models::{
    juz_for_page, juz_range, span_len, wrap_page, JuzMapItem, JuzStatus, ReadingLog, ReadingStats,
    TOTAL_JUZ, TOTAL_QURAN_PAGES,
};
use crate::services::streaks;

/// Sum of `pages_read` across the whole history.
pub fn total_pages_read(logs: &[ReadingLog]) -> i64 {
    logs.iter().map(|log| log.pages_read as i64).sum()
}

/// Completed full readings of all 604 pages.
pub fn total_khatmas(logs: &[ReadingLog]) -> i64 {
    total_pages_read(logs) / TOTAL_QURAN_PAGES as i64
}

/// The chronological slice of history that makes up the current khatma.
///
/// Walks the logs oldest-first (date, then creation order) consuming a
/// budget of `total % 604` pages: whole logs while they fit, then at most
/// one truncated log for the remainder. Completed khatmas partway through a
/// log's range are handled by the truncation, not by any per-log bookkeeping.
fn current_khatma_slices(logs: &[ReadingLog]) -> Vec<(&ReadingLog, i32)> {
    let mut budget = (total_pages_read(logs) % TOTAL_QURAN_PAGES as i64) as i32;

    let mut ordered: Vec<&ReadingLog> = logs.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut slices = Vec::new();
    for log in ordered {
        if budget <= 0 {
            break;
        }
        let take = log.pages_read.min(budget);
        slices.push((log, take));
        budget -= take;
    }
    slices
}

/// Pages of the current khatma attributed to each juz.
///
/// Every page of a selected slice is walked individually so ranges that
/// span juz boundaries or wrap past page 604 land in the right juz, and the
/// per-juz sets keep overlapping ranges from double-counting.
fn attribute_pages(slices: &[(&ReadingLog, i32)]) -> BTreeMap<i32, HashSet<i32>> {
    let mut juz_pages: BTreeMap<i32, HashSet<i32>> =
        (1..=TOTAL_JUZ).map(|juz| (juz, HashSet::new())).collect();

    for (log, pages) in slices {
        let start = log.resolved_start_page();
        let count = match log.end_page {
            Some(end) => span_len(start, end.clamp(1, TOTAL_QURAN_PAGES)),
            None => *pages,
        };

        for offset in 0..count {
            let page = wrap_page(start + offset);
            if let Some(set) = juz_pages.get_mut(&juz_for_page(page)) {
                set.insert(page);
            }
        }
    }

    juz_pages
}

/// 30-entry completion map of the current khatma.
///
/// When the total is an exact multiple of 604 the budget is zero and every
/// juz comes back not-started: a freshly completed khatma resets the map.
pub fn juz_map(logs: &[ReadingLog]) -> Vec<JuzMapItem> {
    let slices = current_khatma_slices(logs);
    let juz_pages = attribute_pages(&slices);

    juz_pages
        .into_iter()
        .map(|(juz_number, pages)| {
            let pages_read = pages.len() as i32;
            let total_pages = juz_range(juz_number).size();
            let percent_complete =
                ((pages_read as f64 / total_pages as f64) * 100.0).round() as i32;

            let status = if pages_read >= total_pages {
                JuzStatus::Completed
            } else if pages_read > 0 {
                JuzStatus::Partial
            } else {
                JuzStatus::NotStarted
            };

            JuzMapItem {
                juz_number,
                status,
                pages_read,
                total_pages,
                percent_complete,
            }
        })
        .collect()
}

/// Aggregate statistics for one user's history as of `today`.
pub fn reading_stats(logs: &[ReadingLog], today: NaiveDate) -> ReadingStats {
    let completed_juz = juz_map(logs)
        .iter()
        .filter(|item| item.status == JuzStatus::Completed)
        .count() as i32;

    ReadingStats {
        total_pages_read: total_pages_read(logs),
        total_khatmas: total_khatmas(logs),
        completed_juz,
        current_streak: streaks::current_streak(logs, today),
        longest_streak: streaks::longest_streak(logs),
        consistency: streaks::consistency_percentage(
            logs,
            streaks::DEFAULT_CONSISTENCY_WINDOW_DAYS,
            today,
        ),
    }
}

/// Whole-history completion percentage against a goal's page total.
pub fn completion_percentage(total_pages_read: i64, goal_total_pages: i32) -> i32 {
    if goal_total_pages <= 0 {
        return 0;
    }
    ((total_pages_read as f64 / goal_total_pages as f64) * 100.0).round() as i32
}

/// Weekly-target completion for pages read since the start of the week.
pub fn weekly_target_completion(pages_this_week: i64, weekly_target: i32) -> i32 {
    if weekly_target <= 0 {
        return 0;
    }
    ((pages_this_week as f64 / weekly_target as f64) * 100.0).round() as i32
}
