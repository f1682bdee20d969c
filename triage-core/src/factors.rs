//! Per-factor sub-scores.
//!
//! Each function is independent; the piecewise breakpoints are product
//! behavior and must stay exactly as written.

use chrono::NaiveDateTime;

use crate::calendar::BusinessCalendar;
use crate::strategy::Strategy;
use crate::task::Task;
use crate::time::parse_due_date;

/// Urgency assigned when the due date cannot be parsed.
pub const NEUTRAL_URGENCY: f64 = 50.0;

const WEEKEND_BONUS: f64 = 10.0;
const SECONDS_PER_DAY: i64 = 86_400;

/// Where a due date sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueOutlook {
    /// Signed distance, in business days or whole calendar days.
    pub days_until: i64,
    /// Due date falls on a Saturday or Sunday.
    pub on_weekend: bool,
    pub business_days: bool,
}

impl DueOutlook {
    pub fn unit(&self) -> &'static str {
        if self.business_days { "business days" } else { "days" }
    }

    fn weekend_bonus(&self) -> f64 {
        if self.business_days && self.on_weekend {
            WEEKEND_BONUS
        } else {
            0.0
        }
    }
}

/// Compute the outlook for a raw due date; `None` when it does not parse.
pub fn due_outlook(
    due_date: &str,
    now: NaiveDateTime,
    calendar: &BusinessCalendar,
    business_days: bool,
) -> Option<DueOutlook> {
    let due = parse_due_date(due_date).ok()?;

    let days_until = if business_days {
        calendar.business_days_between(now, due)
    } else {
        // Floor, so a due time earlier today is already a day late.
        (due - now).num_seconds().div_euclid(SECONDS_PER_DAY)
    };

    Some(DueOutlook {
        days_until,
        on_weekend: calendar.is_weekend(due.date()),
        business_days,
    })
}

/// Urgency from a resolved outlook. Range roughly 0-200.
pub fn urgency_from_outlook(outlook: &DueOutlook) -> f64 {
    let delta = outlook.days_until as f64;
    let bonus = outlook.weekend_bonus();

    if delta < 0.0 {
        (100.0 + delta.abs() * 10.0).min(200.0)
    } else if delta == 0.0 {
        95.0 + bonus
    } else if delta <= 1.0 {
        90.0 + bonus
    } else if delta <= 3.0 {
        80.0 + bonus
    } else if delta <= 7.0 {
        70.0 - (delta - 3.0) * 2.5 + bonus
    } else if delta <= 14.0 {
        55.0 - (delta - 7.0) * 2.0 + bonus
    } else if delta <= 30.0 {
        35.0 - (delta - 14.0) * 1.5 + bonus
    } else {
        (35.0 - (delta - 30.0) * 0.5 + bonus).max(10.0)
    }
}

pub fn urgency_score(
    due_date: &str,
    now: NaiveDateTime,
    calendar: &BusinessCalendar,
    business_days: bool,
) -> f64 {
    due_outlook(due_date, now, calendar, business_days)
        .map(|o| urgency_from_outlook(&o))
        .unwrap_or(NEUTRAL_URGENCY)
}

/// Linear map of the 1-10 rating onto 10-100.
pub fn importance_score(importance: i32) -> f64 {
    f64::from(importance) * 10.0
}

pub fn effort_score(hours: f64, strategy: Strategy) -> f64 {
    match strategy {
        Strategy::FastestWins => match hours {
            h if h <= 1.0 => 90.0,
            h if h <= 3.0 => 70.0,
            h if h <= 8.0 => 50.0,
            _ => 30.0,
        },
        // Peaks at 2-5h on purpose.
        _ => match hours {
            h if h <= 2.0 => 70.0,
            h if h <= 5.0 => 80.0,
            h if h <= 10.0 => 60.0,
            _ => 40.0,
        },
    }
}

/// 20 points per other task in the batch waiting on `idx`, capped at 100.
pub fn dependency_score(idx: usize, tasks: &[Task]) -> f64 {
    let target = idx as i64;
    let blocking = tasks
        .iter()
        .enumerate()
        .filter(|&(i, t)| i != idx && t.dependencies.contains(&target))
        .count();

    (blocking as f64 * 20.0).min(100.0)
}
