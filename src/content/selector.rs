//! Deterministic daily selection
//!
//! Maps a calendar date onto a bucket position. Callers pass dates in UTC so
//! every process agrees on what "today" is.

use chrono::{Datelike, NaiveDate};

/// Picks the bucket index shown on `date`
///
/// `index = (day_of_year + offset_days) mod bucket_len`, where `day_of_year`
/// is the 1-based ordinal of the date within its year (1..=366).
///
/// # Returns
/// * `None` if `bucket_len` is zero
pub fn select_index(date: NaiveDate, bucket_len: usize, offset_days: u32) -> Option<usize> {
    if bucket_len == 0 {
        return None;
    }
    let day = date.ordinal() as usize + offset_days as usize;
    Some(day % bucket_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_of_year(year: i32, ordinal: u32) -> NaiveDate {
        NaiveDate::from_yo_opt(year, ordinal).unwrap()
    }

    #[test]
    fn test_day_ten_with_five_items() {
        let date = day_of_year(2024, 10);
        assert_eq!(select_index(date, 5, 0), Some(0));
        assert_eq!(select_index(date, 5, 7), Some(2));
    }

    #[test]
    fn test_zero_length_bucket() {
        assert_eq!(select_index(day_of_year(2024, 1), 0, 0), None);
    }

    #[test]
    fn test_index_is_in_range_for_whole_leap_year() {
        for ordinal in 1..=366 {
            let date = day_of_year(2024, ordinal);
            for len in 1..=17 {
                for offset in [0, 7] {
                    let index = select_index(date, len, offset).unwrap();
                    assert!(index < len);
                }
            }
        }
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let first = select_index(date, 15, 7);
        for _ in 0..10 {
            assert_eq!(select_index(date, 15, 7), first);
        }
    }

    #[test]
    fn test_first_and_last_day_of_year() {
        assert_eq!(select_index(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 5, 0), Some(1));
        // 365 % 5 == 0
        assert_eq!(select_index(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(), 5, 0), Some(0));
        // leap year: 366 % 5 == 1
        assert_eq!(select_index(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 5, 0), Some(1));
    }

    #[test]
    fn test_offsets_pick_different_positions_most_days() {
        let mut differing = 0;
        for ordinal in 1..=365 {
            let date = day_of_year(2025, ordinal);
            if select_index(date, 5, 0) != select_index(date, 5, 7) {
                differing += 1;
            }
        }
        assert_eq!(differing, 365, "7 is not a multiple of 5, so positions never coincide");
    }
}
