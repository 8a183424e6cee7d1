//! Day/week/month window arithmetic.
//!
//! Windows resolve deterministically from a reference day. Weeks are rolling
//! 7-day spans ending at `reference + offset * 7`, not ISO weeks; months are
//! calendar months shifted by whole-month offsets.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Inclusive `[start, end]` of the 7-day window ending at
/// `reference + offset * 7` days. `offset` 0 is the window ending today,
/// negative offsets walk into the past.
pub fn week_window(reference: NaiveDate, offset: i32) -> (NaiveDate, NaiveDate) {
    let end = shift_days(reference, i64::from(offset) * 7);
    let start = shift_days(end, -6);
    (start, end)
}

/// The exact 7 calendar dates of [`week_window`], ascending.
pub fn week_dates(reference: NaiveDate, offset: i32) -> Vec<NaiveDate> {
    let (start, end) = week_window(reference, offset);
    days_between(start, end)
}

/// Inclusive `[first, last]` day of the calendar month `offset` months from
/// the reference day's month.
pub fn month_window(reference: NaiveDate, offset: i32) -> (NaiveDate, NaiveDate) {
    let anchor = reference.with_day(1).unwrap_or(reference);
    let first = if offset >= 0 {
        anchor
            .checked_add_months(Months::new(offset.unsigned_abs()))
            .unwrap_or(anchor)
    } else {
        anchor
            .checked_sub_months(Months::new(offset.unsigned_abs()))
            .unwrap_or(anchor)
    };

    let next_month = first.checked_add_months(Months::new(1)).unwrap_or(first);
    let last = shift_days(next_month, -1);
    (first, last)
}

/// All dates in `[start, end]` inclusive, ascending. Empty when the range is
/// inverted.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current = shift_days(current, 1);
    }
    days
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
            .unwrap_or(date)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(date)
    }
}
