//! Diesel row structs mirroring the database schema.
//!
//! Rows are plain database shapes; conversions to and from the domain
//! types live here so the rest of the crate never sees Diesel types.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{reading_goals, reading_logs};
use crate::models::{
    NewReadingGoal, NewReadingLog, ReadingGoal, ReadingGoalId, ReadingLog, ReadingLogId, UserId,
};

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = reading_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReadingLogRow {
    pub id: i32,
    pub user_id: i32,
    pub date: NaiveDate,
    pub juz_number: i32,
    pub pages_read: i32,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = reading_logs)]
pub struct NewReadingLogRow {
    pub user_id: i32,
    pub date: NaiveDate,
    pub juz_number: i32,
    pub pages_read: i32,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
}

impl From<ReadingLogRow> for ReadingLog {
    fn from(row: ReadingLogRow) -> Self {
        ReadingLog {
            id: ReadingLogId::new(row.id),
            user_id: UserId::new(row.user_id),
            date: row.date,
            juz_number: row.juz_number,
            pages_read: row.pages_read,
            start_page: row.start_page,
            end_page: row.end_page,
            created_at: row.created_at,
        }
    }
}

impl From<&NewReadingLog> for NewReadingLogRow {
    fn from(new_log: &NewReadingLog) -> Self {
        NewReadingLogRow {
            user_id: new_log.user_id.value(),
            date: new_log.date,
            juz_number: new_log.juz_number,
            pages_read: new_log.pages_read,
            start_page: new_log.start_page,
            end_page: new_log.end_page,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = reading_goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReadingGoalRow {
    pub id: i32,
    pub user_id: i32,
    pub total_pages: i32,
    pub daily_target: i32,
    pub weekly_target: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = reading_goals)]
pub struct NewReadingGoalRow {
    pub user_id: i32,
    pub total_pages: i32,
    pub daily_target: i32,
    pub weekly_target: i32,
    pub is_active: bool,
}

impl From<ReadingGoalRow> for ReadingGoal {
    fn from(row: ReadingGoalRow) -> Self {
        ReadingGoal {
            id: ReadingGoalId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_pages: row.total_pages,
            daily_target: row.daily_target,
            weekly_target: row.weekly_target,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl From<&NewReadingGoal> for NewReadingGoalRow {
    fn from(new_goal: &NewReadingGoal) -> Self {
        NewReadingGoalRow {
            user_id: new_goal.user_id.value(),
            total_pages: new_goal.total_pages,
            daily_target: new_goal.daily_target,
            weekly_target: new_goal.weekly_target,
            is_active: new_goal.is_active,
        }
    }
}
