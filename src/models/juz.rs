//! Juz partition of the mushaf and page resolution.
//!
//! The 604 pages divide into 30 juz of unequal size: juz 1 spans 21 pages,
//! juz 30 spans 23, and juz 2-29 span 20 each. Every derived statistic in
//! this crate is built on top of this fixed partition.

use serde::{Deserialize, Serialize};

/// Total pages in the mushaf.
pub const TOTAL_QURAN_PAGES: i32 = 604;

/// Number of juz divisions.
pub const TOTAL_JUZ: i32 = 30;

/// Inclusive page range of a single juz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuzRange {
    pub start: i32,
    pub end: i32,
}

impl JuzRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Number of pages in this juz.
    pub fn size(&self) -> i32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, page: i32) -> bool {
        page >= self.start && page <= self.end
    }
}

/// Page range of a juz. Input outside 1-30 is clamped.
pub fn juz_range(juz_number: i32) -> JuzRange {
    let juz = juz_number.clamp(1, TOTAL_JUZ);
    if juz == 1 {
        JuzRange::new(1, 21)
    } else if juz == TOTAL_JUZ {
        JuzRange::new(582, TOTAL_QURAN_PAGES)
    } else {
        // Juz 2 starts at page 22; each of juz 2-29 spans 20 pages.
        let start = 22 + (juz - 2) * 20;
        JuzRange::new(start, start + 19)
    }
}

/// Juz containing the given page. Input outside 1-604 is clamped.
pub fn juz_for_page(page: i32) -> i32 {
    let page = page.clamp(1, TOTAL_QURAN_PAGES);
    if page <= 21 {
        1
    } else if page >= 582 {
        TOTAL_JUZ
    } else {
        (page - 22) / 20 + 2
    }
}

/// Normalize an arbitrary 1-based page offset back into 1..=604.
///
/// A session may run past page 604 and continue at page 1 (completing one
/// khatma and starting the next); landing exactly on the boundary yields
/// 604, never 0.
pub fn wrap_page(page: i32) -> i32 {
    (page - 1).rem_euclid(TOTAL_QURAN_PAGES) + 1
}

/// End page of a run of `pages_read` pages starting at `start_page`,
/// wrapping past the end of the mushaf.
pub fn end_page_for(start_page: i32, pages_read: i32) -> i32 {
    wrap_page(start_page + pages_read - 1)
}

/// Number of pages in the inclusive span from `start` to `end`, where an
/// end before the start means the span wraps through page 604.
pub fn span_len(start: i32, end: i32) -> i32 {
    (end - start).rem_euclid(TOTAL_QURAN_PAGES) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ranges() {
        assert_eq!(juz_range(1), JuzRange::new(1, 21));
        assert_eq!(juz_range(2), JuzRange::new(22, 41));
        assert_eq!(juz_range(29), JuzRange::new(562, 581));
        assert_eq!(juz_range(30), JuzRange::new(582, 604));
    }

    #[test]
    fn test_sizes() {
        assert_eq!(juz_range(1).size(), 21);
        assert_eq!(juz_range(30).size(), 23);
        for juz in 2..=29 {
            assert_eq!(juz_range(juz).size(), 20, "juz {}", juz);
        }
    }

    #[test]
    fn test_partition_covers_all_pages() {
        // Contiguous, no gaps or overlaps, sizes sum to 604.
        let mut expected_start = 1;
        let mut total = 0;
        for juz in 1..=TOTAL_JUZ {
            let range = juz_range(juz);
            assert_eq!(range.start, expected_start, "juz {} start", juz);
            expected_start = range.end + 1;
            total += range.size();
        }
        assert_eq!(expected_start, TOTAL_QURAN_PAGES + 1);
        assert_eq!(total, TOTAL_QURAN_PAGES);
    }

    #[test]
    fn test_every_page_resolves_to_its_range() {
        for page in 1..=TOTAL_QURAN_PAGES {
            let juz = juz_for_page(page);
            assert!((1..=TOTAL_JUZ).contains(&juz), "page {}", page);
            assert!(juz_range(juz).contains(page), "page {} -> juz {}", page, juz);
        }
    }

    #[test]
    fn test_resolver_round_trip() {
        for juz in 1..=TOTAL_JUZ {
            let range = juz_range(juz);
            assert_eq!(juz_for_page(range.start), juz, "juz {} start", juz);
            assert_eq!(juz_for_page(range.end), juz, "juz {} end", juz);
        }
    }

    #[test]
    fn test_boundary_pages() {
        assert_eq!(juz_for_page(21), 1);
        assert_eq!(juz_for_page(22), 2);
        assert_eq!(juz_for_page(41), 2);
        assert_eq!(juz_for_page(42), 3);
        assert_eq!(juz_for_page(581), 29);
        assert_eq!(juz_for_page(582), 30);
    }

    #[test]
    fn test_out_of_range_inputs_clamp() {
        assert_eq!(juz_for_page(0), 1);
        assert_eq!(juz_for_page(-5), 1);
        assert_eq!(juz_for_page(605), 30);
        assert_eq!(juz_range(0), juz_range(1));
        assert_eq!(juz_range(31), juz_range(30));
    }

    #[test]
    fn test_wrap_page() {
        assert_eq!(wrap_page(1), 1);
        assert_eq!(wrap_page(604), 604);
        assert_eq!(wrap_page(605), 1);
        assert_eq!(wrap_page(609), 5);
        assert_eq!(wrap_page(1208), 604);
    }

    #[test]
    fn test_end_page_wraparound() {
        // 600..=604 is five pages, five more wrap to page 5.
        assert_eq!(end_page_for(600, 10), 5);
        // Landing exactly on the boundary normalizes to 604, never 0.
        assert_eq!(end_page_for(595, 10), 604);
        assert_eq!(end_page_for(1, 21), 21);
        assert_eq!(end_page_for(604, 1), 604);
        assert_eq!(end_page_for(604, 2), 1);
    }

    #[test]
    fn test_span_len() {
        assert_eq!(span_len(1, 21), 21);
        assert_eq!(span_len(600, 5), 10);
        assert_eq!(span_len(10, 10), 1);
        assert_eq!(span_len(604, 1), 2);
    }
}
