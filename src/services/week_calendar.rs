//! Week arithmetic over calendar dates.
//!
//! All functions work on whole dates. Timestamps must be reduced to their UTC
//! calendar date first (see [`weeks_between_instants`]) so a plan stored as
//! `2024-03-04T00:00:00Z` counts the same regardless of the local zone.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

/// Whole seven-day periods from `start` to `end`; zero when `end` is not after `start`
pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let days = (end - start).num_days();
    if days <= 0 {
        0
    } else {
        days / 7
    }
}

/// [`weeks_between`] for timestamps, compared by UTC calendar date
pub fn weeks_between_instants<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
    weeks_between(start.naive_utc().date(), end.naive_utc().date())
}

/// Zero-based week index of `today` relative to `start`.
///
/// Negative when the plan has not started yet.
pub fn week_index_for_today(start: NaiveDate, today: NaiveDate) -> i64 {
    (today - start).num_days().div_euclid(7)
}

/// Date range `[first, last_exclusive)` covered by 1-based week `week_number`
pub fn week_range(start: NaiveDate, week_number: u32) -> (NaiveDate, NaiveDate) {
    let first = week_start(start, week_number);
    (first, first + Duration::days(7))
}

/// First day of 1-based week `week_number`
pub fn week_start(start: NaiveDate, week_number: u32) -> NaiveDate {
    let offset = i64::from(week_number.saturating_sub(1)) * 7;
    start + Duration::days(offset)
}

/// 1-based plan week containing `today`, clamped to the plan length.
///
/// Returns `None` before the plan starts or when the plan has no weeks.
pub fn current_plan_week(start: NaiveDate, today: NaiveDate, total_weeks: u32) -> Option<u32> {
    if total_weeks == 0 {
        return None;
    }
    let index = week_index_for_today(start, today);
    if index < 0 {
        return None;
    }
    let week = u32::try_from(index + 1).unwrap_or(u32::MAX);
    Some(week.min(total_weeks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_weeks_between_reference_values() {
        assert_eq!(weeks_between(date("2024-01-01"), date("2024-01-08")), 1);
        assert_eq!(weeks_between(date("2024-01-01"), date("2024-01-15")), 2);
        assert_eq!(weeks_between(date("2024-01-01"), date("2024-07-01")), 26);
        assert_eq!(weeks_between(date("2024-01-01"), date("2025-01-01")), 52);
        assert_eq!(weeks_between(date("2024-01-01"), date("2024-01-07")), 0);
    }

    #[test]
    fn test_weeks_between_reversed_is_zero() {
        assert_eq!(weeks_between(date("2024-02-01"), date("2024-01-01")), 0);
    }

    #[test]
    fn test_instants_use_utc_dates() {
        let tz = FixedOffset::east_opt(10 * 3600).unwrap();
        // Local 2024-01-01 05:00 at +10 is still 2023-12-31 in UTC
        let start = tz.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap().with_timezone(&tz);
        assert_eq!(weeks_between_instants(&start, &end), 1);
    }

    #[test]
    fn test_week_index_and_range() {
        let start = date("2024-03-04");
        assert_eq!(week_index_for_today(start, date("2024-03-04")), 0);
        assert_eq!(week_index_for_today(start, date("2024-03-10")), 0);
        assert_eq!(week_index_for_today(start, date("2024-03-11")), 1);
        assert_eq!(week_index_for_today(start, date("2024-03-03")), -1);
        assert_eq!(week_index_for_today(start, date("2024-02-25")), -2);

        assert_eq!(week_range(start, 2), (date("2024-03-11"), date("2024-03-18")));
    }

    #[test]
    fn test_current_plan_week() {
        let start = date("2024-03-04");
        assert_eq!(current_plan_week(start, date("2024-03-01"), 12), None);
        assert_eq!(current_plan_week(start, date("2024-03-04"), 12), Some(1));
        assert_eq!(current_plan_week(start, date("2024-03-20"), 12), Some(3));
        assert_eq!(current_plan_week(start, date("2025-01-01"), 12), Some(12));
        assert_eq!(current_plan_week(start, date("2024-03-20"), 0), None);
    }

    proptest! {
        #[test]
        fn prop_weeks_between_matches_day_count(offset in 0i64..5_000, extra in 0i64..5_000) {
            let start = date("2000-01-01") + Duration::days(offset);
            let end = start + Duration::days(extra);
            prop_assert_eq!(weeks_between(start, end), extra / 7);
            prop_assert_eq!(weeks_between(end, start), 0);
        }

        #[test]
        fn prop_today_lies_in_its_week_range(days in 0i64..2_000) {
            let start = date("2024-01-01");
            let today = start + Duration::days(days);
            let week = (week_index_for_today(start, today) + 1) as u32;
            let (first, last) = week_range(start, week);
            prop_assert!(first <= today && today < last);
        }
    }
}
