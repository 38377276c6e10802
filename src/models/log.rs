//! Reading log entities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::juz::{end_page_for, juz_range, TOTAL_JUZ, TOTAL_QURAN_PAGES};
use super::UserId;

crate::define_id_type!(i32, ReadingLogId);

/// One logged reading session.
///
/// Logs are append-only: they are created once and never updated or deleted
/// individually. The bulk clear-data operation wipes the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingLog {
    pub id: ReadingLogId,
    pub user_id: UserId,
    /// Calendar date of the session; streaks and consistency are computed
    /// over this, not over `created_at`.
    pub date: NaiveDate,
    /// Juz the session is primarily associated with, declared by the caller.
    pub juz_number: i32,
    pub pages_read: i32,
    /// Explicit page range; when absent the range is derived from
    /// `juz_number` and `pages_read`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_page: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_page: Option<i32>,
    /// Tie-breaker for ordering logs that share a date.
    pub created_at: DateTime<Utc>,
}

impl ReadingLog {
    /// Start page of the session.
    ///
    /// Falls back to the first page of the declared juz when no explicit
    /// start page was logged. The fallback assumes the session started at
    /// the beginning of the juz; the formula is part of the stored data's
    /// meaning and must not change.
    pub fn resolved_start_page(&self) -> i32 {
        match self.start_page {
            Some(page) => page.clamp(1, TOTAL_QURAN_PAGES),
            None => juz_range(self.juz_number).start,
        }
    }

    /// Inclusive end page, derived from the start page and `pages_read`
    /// when no explicit end page was logged. Derivation wraps past page 604.
    pub fn resolved_end_page(&self) -> i32 {
        match self.end_page {
            Some(page) => page.clamp(1, TOTAL_QURAN_PAGES),
            None => end_page_for(self.resolved_start_page(), self.pages_read),
        }
    }
}

/// Fields required to create a reading log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReadingLog {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub juz_number: i32,
    pub pages_read: i32,
    #[serde(default)]
    pub start_page: Option<i32>,
    #[serde(default)]
    pub end_page: Option<i32>,
}

impl NewReadingLog {
    pub fn new(user_id: UserId, date: NaiveDate, juz_number: i32, pages_read: i32) -> Self {
        Self {
            user_id,
            date,
            juz_number,
            pages_read,
            start_page: None,
            end_page: None,
        }
    }

    pub fn with_pages(mut self, start_page: i32, end_page: i32) -> Self {
        self.start_page = Some(start_page);
        self.end_page = Some(end_page);
        self
    }

    /// Field-level checks applied before a log reaches storage.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=TOTAL_JUZ).contains(&self.juz_number) {
            return Err(format!(
                "juz_number must be between 1 and {}, got {}",
                TOTAL_JUZ, self.juz_number
            ));
        }
        if self.pages_read < 1 {
            return Err(format!(
                "pages_read must be at least 1, got {}",
                self.pages_read
            ));
        }
        for page in [self.start_page, self.end_page].into_iter().flatten() {
            if !(1..=TOTAL_QURAN_PAGES).contains(&page) {
                return Err(format!(
                    "page numbers must be between 1 and {}, got {}",
                    TOTAL_QURAN_PAGES, page
                ));
            }
        }
        Ok(())
    }
}
