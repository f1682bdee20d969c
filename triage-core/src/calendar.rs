//! Business-day calendar: weekends, observed holidays, signed day deltas.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const SECONDS_PER_DAY: i64 = 86_400;

/// US federal holidays observed in 2025.
const DEFAULT_HOLIDAYS: [(i32, u32, u32); 10] = [
    (2025, 1, 1),   // New Year's Day
    (2025, 1, 20),  // Martin Luther King Jr. Day
    (2025, 2, 17),  // Presidents' Day
    (2025, 5, 26),  // Memorial Day
    (2025, 7, 4),   // Independence Day
    (2025, 9, 1),   // Labor Day
    (2025, 10, 13), // Columbus Day
    (2025, 11, 11), // Veterans Day
    (2025, 11, 27), // Thanksgiving
    (2025, 12, 25), // Christmas
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOLIDAYS
                .iter()
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        )
    }
}

impl BusinessCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Calendar with weekends only.
    pub fn without_holidays() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Signed count of business days walked from `start` towards `end`.
    ///
    /// The walk visits `start`, `start + 1d`, ... while strictly before `end`,
    /// so the end day is never counted and time-of-day matters. A reversed
    /// range yields the negated count of the swapped range.
    pub fn business_days_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> i64 {
        if start > end {
            return -self.business_days_between(end, start);
        }

        let steps = walk_steps(end - start);
        if steps == 0 {
            return 0;
        }

        let first = start.date();
        let offset = i64::from(first.weekday().num_days_from_monday());
        let tail = (0..steps % 7).filter(|r| (offset + r) % 7 < 5).count() as i64;
        let weekdays = (steps / 7) * 5 + tail;

        // Last visited day is on or before `end`, so it always exists.
        let holidays = match first.checked_add_days(Days::new((steps - 1) as u64)) {
            Some(last) => self.weekday_holidays(self.holidays.range(first..=last)),
            None => self.weekday_holidays(self.holidays.range(first..)),
        };

        weekdays - holidays
    }

    fn weekday_holidays<'a>(&self, dates: impl Iterator<Item = &'a NaiveDate>) -> i64 {
        dates.filter(|d| !self.is_weekend(**d)).count() as i64
    }
}

/// Number of whole-day steps `k` with `k * 1d < span` (span is non-negative).
fn walk_steps(span: TimeDelta) -> i64 {
    let secs = span.num_seconds();
    let partial = secs % SECONDS_PER_DAY != 0 || span.subsec_nanos() > 0;
    secs / SECONDS_PER_DAY + i64::from(partial)
}
