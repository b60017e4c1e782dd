//! Month grids, as displayed by a calendar
//!
//! A grid always covers whole weeks: the days of the requested month, plus the
//! "padding" days of the adjacent months that complete the first and last rows.

pub mod summary;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// The first day of a week. This is the same for the whole crate
pub const WEEK_START: Weekday = Weekday::Sun;


/// A day of a month grid
#[derive(Clone, Debug, PartialEq)]
pub struct Day {
    date: NaiveDate,
    /// Whether this day belongs to the requested month (or is a padding day from an adjacent month)
    in_month: bool,
    is_selected: bool,
}

impl Day {
    pub fn date(&self) -> NaiveDate { self.date }
    pub fn in_month(&self) -> bool  { self.in_month }
    pub fn is_selected(&self) -> bool { self.is_selected }
}


/// Returns every day to display for the month that contains `month`, in chronological order.
///
/// `month` can be any day of the month. The returned length is always a multiple of 7.
pub fn build_grid(month: NaiveDate, selected: NaiveDate) -> Vec<Day> {
    let month_start = first_day_of_month(month);
    let month_end = last_day_of_month(month);
    let grid_start = start_of_week(month_start);
    let grid_end = end_of_week(month_end);

    let mut days = Vec::new();
    let mut current = grid_start;
    while current <= grid_end {
        days.push(Day {
            date: current,
            in_month: same_month(current, month_start),
            is_selected: current == selected,
        });
        current = current + Duration::days(1);
    }
    log::trace!("Built a grid of {} days for {}", days.len(), month_start.format("%Y-%m"));
    days
}

/// The first day of the week that contains `day`
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let offset = days_since_week_start(day.weekday());
    day - Duration::days(offset)
}

/// The last day of the week that contains `day`
pub fn end_of_week(day: NaiveDate) -> NaiveDate {
    start_of_week(day) + Duration::days(6)
}

fn days_since_week_start(weekday: Weekday) -> i64 {
    let from_monday = weekday.num_days_from_monday() as i64;
    let start_from_monday = WEEK_START.num_days_from_monday() as i64;
    (from_monday - start_from_monday).rem_euclid(7)
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.day0() as i64)
}

pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    add_months(first_day_of_month(day), 1) - Duration::days(1)
}

pub fn same_month(left: NaiveDate, right: NaiveDate) -> bool {
    left.year() == right.year() && left.month() == right.month()
}

/// Move by `months` months (that can be negative).
///
/// The day of month is kept when possible, and clamped to the length of the target month otherwise (e.g. Jan 31st + 1 month is Feb 28th or 29th).
pub fn add_months(day: NaiveDate, months: i32) -> NaiveDate {
    let zero_based = day.year() * 12 + day.month0() as i32 + months;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;

    let mut day_of_month = day.day();
    loop {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day_of_month) {
            return date;
        }
        // Every month has at least 28 days, this loop is bound to end
        day_of_month -= 1;
    }
}
