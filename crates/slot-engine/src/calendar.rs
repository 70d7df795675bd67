//! Date-level helpers for the booking calendar.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{DayWindow, Schedule};
use crate::slots::{effective_window, weekday_index};

/// How far ahead the booking calendar offers dates by default.
pub const DEFAULT_HORIZON_DAYS: u32 = 90;

/// Dates in `[today, today + horizon_days)` on which `schedule` is open.
pub fn bookable_dates(schedule: &Schedule, today: NaiveDate, horizon_days: u32) -> Vec<NaiveDate> {
    today
        .iter_days()
        .take(horizon_days as usize)
        .filter(|d| schedule.is_open_on(weekday_index(*d)))
        .collect()
}

/// One month laid out for a Sunday-first calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    /// Empty cells before the 1st (its weekday number).
    pub leading_blanks: u8,
    pub days: Vec<NaiveDate>,
}

/// Lay out `month` of `year`. `None` for a month outside 1..=12.
pub fn month_grid(year: i32, month: u32) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(MonthGrid {
        leading_blanks: weekday_index(first),
        days: first.iter_days().take_while(|d| *d < next).collect(),
    })
}

/// Earliest opening and latest closing across the schedule's open weekdays.
///
/// This is the span shown on a schedule card. With no open weekday it is the
/// default window.
pub fn time_range_summary(schedule: &Schedule) -> DayWindow {
    let mut windows = schedule
        .days_of_week
        .iter()
        .map(|day| effective_window(schedule, *day));

    let Some(first) = windows.next() else {
        return schedule.default_window();
    };
    windows.fold(first, |acc, w| DayWindow {
        start: acc.start.min(w.start),
        end: acc.end.max(w.end),
    })
}
