//! Calendar month arithmetic for the simulation loop.

use chrono::{Datelike, NaiveDate};

/// Inclusive list of simulated months between start and end.
///
/// The first entry is the start date itself; each subsequent entry
/// is the first of the following month. This mirrors how the month
/// range is anchored in the reference run (start 2023-06-30, then
/// 2023-07-01, 2023-08-01, ...).
pub fn month_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = start;
    while current <= end {
        months.push(current);
        current = first_of_next_month(current);
    }
    months
}

/// First day of the month after the given date.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month always exists")
}

/// Year-month period label, e.g. "2024-01".
pub fn period_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Concrete date for a drawn day within the given month.
/// Days are drawn in [1, 28], which exists in every month.
pub fn date_in_month(month: NaiveDate, day: u32) -> NaiveDate {
    debug_assert!((1..=28).contains(&day));
    NaiveDate::from_ymd_opt(month.year(), month.month(), day)
        .expect("days 1-28 exist in every month")
}
