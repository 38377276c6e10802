//! Service layer for progress derivation and streak analytics.
//!
//! Everything in this module is a pure function over reading logs. The
//! database layer fetches logs and goals; these services turn them into
//! juz maps, khatma counts, streaks and goal progress without touching
//! storage themselves.

pub mod progress;

pub mod streaks;


pub use progress::{
    completion_percentage, juz_map, reading_stats, total_khatmas, total_pages_read,
    weekly_target_completion,
};
pub use streaks::{
    consistency_percentage, current_streak, longest_streak, start_of_week,
    DEFAULT_CONSISTENCY_WINDOW_DAYS,
};
