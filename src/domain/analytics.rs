//! Calendar-window arithmetic for the dashboard aggregator.
//!
//! Everything here is pure: the aggregation services feed repository rows
//! through these functions and cache the result.

use time::{Date, Duration, OffsetDateTime, Time};

/// First instant of the calendar month containing `at`.
pub fn month_start(at: OffsetDateTime) -> OffsetDateTime {
    // Day 1 is valid for every month; fall back to the input untouched.
    at.replace_day(1).unwrap_or(at).replace_time(Time::MIDNIGHT)
}

/// A half-open calendar window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl MonthWindow {
    /// The running month: first-of-month up to (exclusive) `now`.
    pub fn current(now: OffsetDateTime) -> Self {
        Self {
            start: month_start(now),
            end: now,
        }
    }

    /// The full calendar month before the one containing `now`.
    pub fn previous(now: OffsetDateTime) -> Self {
        let this_start = month_start(now);
        Self {
            start: month_start(this_start - Duration::days(1)),
            end: this_start,
        }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        at >= self.start && at < self.end
    }
}

/// A trailing N-month series ending at `now`, bucketed by calendar month.
///
/// Bucket `N - 1` is the month containing `now`; bucket `0` is `N - 1`
/// months earlier. Month distance uses the modulo-12 form so December is
/// three months before March regardless of the year rollover in between.
/// The bucketing reasons about month numbers only; callers feed it rows
/// from a store query already bounded by [`TrailingWindow::start`].
#[derive(Debug, Clone, Copy)]
pub struct TrailingWindow {
    months: u32,
    now: OffsetDateTime,
}

impl TrailingWindow {
    pub fn new(months: u32, now: OffsetDateTime) -> Self {
        Self { months, now }
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    /// First instant of the oldest bucket, for windowed store queries.
    pub fn start(&self) -> OffsetDateTime {
        let mut cursor = month_start(self.now);
        for _ in 1..self.months {
            cursor = month_start(cursor - Duration::days(1));
        }
        cursor
    }

    /// Bucket for a timestamp, or `None` when it falls outside the window.
    pub fn bucket_index(&self, at: OffsetDateTime) -> Option<usize> {
        let now_month = i32::from(u8::from(self.now.month()));
        let at_month = i32::from(u8::from(at.month()));
        let diff = (now_month - at_month + 12) % 12;
        if diff < self.months as i32 {
            Some((self.months as i32 - 1 - diff) as usize)
        } else {
            None
        }
    }

    /// Per-bucket record counts for a set of timestamps.
    pub fn counts(&self, stamps: impl IntoIterator<Item = OffsetDateTime>) -> Vec<u64> {
        let mut buckets = vec![0_u64; self.months as usize];
        for at in stamps {
            if let Some(index) = self.bucket_index(at) {
                buckets[index] += 1;
            }
        }
        buckets
    }
}

/// Month-over-month change as a rounded percentage.
///
/// A zero baseline treats any current value as a full "new" increase
/// (`current * 100`) rather than dividing by zero.
pub fn change_percent(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        current * 100
    } else {
        (((current - previous) as f64 / previous as f64) * 100.0).round() as i64
    }
}

/// `part` as a rounded percentage of `whole`; zero when `whole` is zero.
pub fn share_percent(part: u64, whole: u64) -> i64 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as i64
    }
}

/// Completed years between `born` and `on`.
pub fn age_years(born: Date, on: Date) -> i32 {
    let mut age = on.year() - born.year();
    if (u8::from(on.month()), on.day()) < (u8::from(born.month()), born.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn month_start_truncates_to_first_midnight() {
        let at = datetime!(2025-03-15 13:45:12 UTC);
        assert_eq!(month_start(at), datetime!(2025-03-01 00:00 UTC));
    }

    #[test]
    fn current_window_is_first_of_month_to_now() {
        let now = datetime!(2025-03-15 12:00 UTC);
        let window = MonthWindow::current(now);
        assert_eq!(window.start, datetime!(2025-03-01 00:00 UTC));
        assert_eq!(window.end, now);
        assert!(window.contains(datetime!(2025-03-10 09:00 UTC)));
        assert!(!window.contains(now));
    }

    #[test]
    fn previous_window_spans_full_prior_month() {
        let now = datetime!(2025-03-15 12:00 UTC);
        let window = MonthWindow::previous(now);
        assert_eq!(window.start, datetime!(2025-02-01 00:00 UTC));
        assert_eq!(window.end, datetime!(2025-03-01 00:00 UTC));
    }

    #[test]
    fn previous_window_crosses_year_boundary() {
        let now = datetime!(2025-01-20 08:00 UTC);
        let window = MonthWindow::previous(now);
        assert_eq!(window.start, datetime!(2024-12-01 00:00 UTC));
        assert_eq!(window.end, datetime!(2025-01-01 00:00 UTC));
    }

    #[test]
    fn bucket_index_places_december_order_across_year_boundary() {
        // Three months before a March "now" is the previous December; a
        // six-month series must land it in bucket 6 - 3 - 1 = 2.
        let window = TrailingWindow::new(6, datetime!(2025-03-15 12:00 UTC));
        let index = window.bucket_index(datetime!(2024-12-20 10:00 UTC));
        assert_eq!(index, Some(2));
    }

    #[test]
    fn bucket_index_is_none_outside_window() {
        let window = TrailingWindow::new(6, datetime!(2025-03-15 12:00 UTC));
        assert_eq!(window.bucket_index(datetime!(2024-08-01 00:00 UTC)), None);
    }

    #[test]
    fn newest_bucket_is_last() {
        let window = TrailingWindow::new(6, datetime!(2025-03-15 12:00 UTC));
        assert_eq!(window.bucket_index(datetime!(2025-03-02 00:00 UTC)), Some(5));
        assert_eq!(window.bucket_index(datetime!(2025-02-02 00:00 UTC)), Some(4));
    }

    #[test]
    fn twelve_month_window_start() {
        let window = TrailingWindow::new(12, datetime!(2025-03-15 12:00 UTC));
        assert_eq!(window.start(), datetime!(2024-04-01 00:00 UTC));
        assert_eq!(window.bucket_index(datetime!(2024-04-03 00:00 UTC)), Some(0));
    }

    #[test]
    fn counts_accumulate_per_bucket() {
        let window = TrailingWindow::new(6, datetime!(2025-03-15 12:00 UTC));
        let counts = window.counts([
            datetime!(2025-03-01 00:00 UTC),
            datetime!(2025-03-10 00:00 UTC),
            datetime!(2024-12-20 10:00 UTC),
            datetime!(2024-09-01 00:00 UTC), // outside, dropped
        ]);
        assert_eq!(counts, vec![0, 0, 1, 0, 0, 2]);
    }

    #[test]
    fn change_percent_with_zero_baseline() {
        assert_eq!(change_percent(0, 0), 0);
        assert_eq!(change_percent(7, 0), 700);
    }

    #[test]
    fn change_percent_rounds_signed() {
        assert_eq!(change_percent(150, 100), 50);
        assert_eq!(change_percent(50, 100), -50);
        assert_eq!(change_percent(100, 300), -67);
    }

    #[test]
    fn share_percent_rounds_and_guards_zero() {
        assert_eq!(share_percent(1, 3), 33);
        assert_eq!(share_percent(2, 3), 67);
        assert_eq!(share_percent(5, 0), 0);
    }

    #[test]
    fn age_counts_completed_years_only() {
        assert_eq!(age_years(date!(2000 - 06 - 15), date!(2025 - 06 - 14)), 24);
        assert_eq!(age_years(date!(2000 - 06 - 15), date!(2025 - 06 - 15)), 25);
    }
}
