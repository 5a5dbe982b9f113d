//! Date helpers shared by the page assemblers and action handlers.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Date shown by the planner: the URL segment when it is a valid ISO date,
/// otherwise today.
pub fn planner_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    raw.and_then(parse_iso_date).unwrap_or(today)
}

pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    if !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Half-open range `[first day, first day of next month)`.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = month_start(year, month)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((start, end))
}

pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn month_name(year: i32, month: u32) -> String {
    month_start(year, month)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default()
}

/// Year/month taken from query parameters. Each missing or malformed part
/// falls back to the current one; an impossible combination falls back to
/// the current month.
pub fn resolve_year_month(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> (i32, u32) {
    let y = year
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(today.year());
    let m = month
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(today.month());

    match month_start(y, m) {
        Some(_) => (y, m),
        None => (today.year(), today.month()),
    }
}

/// `[midnight, next midnight)` for a calendar day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date
        .succ_opt()
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}
