//! Date normalisation for ledger rows.
//!
//! Rows carry their date as free text entered by hand or pulled from a
//! spreadsheet, so every comparison goes through [`parse_date_value`], which
//! folds the accepted shapes into one sortable millisecond timestamp. Calendar
//! values are treated as naive wall-clock times, so a row dated `05/01/2026`
//! and one dated `2026-01-05` land on the same instant.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::time::Clock;

/// Timestamp assigned to blank or unreadable dates; sorts after every real date.
pub const INVALID_DATE: i64 = 9_999_999_999_999;

const EXCEL_EPOCH_OFFSET_DAYS: i64 = 25_569;
const MS_PER_DAY: i64 = 86_400_000;
const LEGACY_DEFAULT_YEAR: i32 = 2026;

/// Full Indonesian month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

static MONTH_ABBREVIATIONS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        ("Jan", 1),
        ("Feb", 2),
        ("Mar", 3),
        ("Apr", 4),
        ("May", 5),
        ("Mei", 5),
        ("Jun", 6),
        ("Jul", 7),
        ("Aug", 8),
        ("Agu", 8),
        ("Sep", 9),
        ("Oct", 10),
        ("Okt", 10),
        ("Nov", 11),
        ("Dec", 12),
        ("Des", 12),
    ]
    .into_iter()
    .collect()
});

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Anything a row date can arrive as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateInput<'a> {
    Native(NaiveDateTime),
    Text(&'a str),
    Missing,
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(value: &'a str) -> Self {
        DateInput::Text(value)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(value: &'a String) -> Self {
        DateInput::Text(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for DateInput<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(DateInput::Missing, DateInput::Text)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(value: NaiveDate) -> Self {
        DateInput::Native(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for DateInput<'_> {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::Native(value)
    }
}

/// Parses `input` into a millisecond timestamp, defaulting a missing slash-year to
/// the clock's current year. Never fails: unreadable input yields [`INVALID_DATE`].
pub fn parse_date_value<'a>(input: impl Into<DateInput<'a>>, clock: &dyn Clock) -> i64 {
    parse_date_value_in_year(input, clock.today().year())
}

/// Same as [`parse_date_value`] with an explicit year for `D/M` inputs.
pub fn parse_date_value_in_year<'a>(input: impl Into<DateInput<'a>>, current_year: i32) -> i64 {
    match input.into() {
        DateInput::Native(value) => to_millis(value),
        DateInput::Missing => INVALID_DATE,
        DateInput::Text(raw) => parse_text(raw, current_year).unwrap_or(INVALID_DATE),
    }
}

fn parse_text(raw: &str, current_year: i32) -> Option<i64> {
    let text = raw.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("undefined")
    {
        return None;
    }

    if text.len() == 5 && text.bytes().all(|b| b.is_ascii_digit()) {
        let serial: i64 = text.parse().ok()?;
        return Some((serial - EXCEL_EPOCH_OFFSET_DAYS) * MS_PER_DAY);
    }

    if text.contains('/') {
        return parse_slashed(text, current_year).map(day_start_millis);
    }

    if let Some(timestamp) = parse_generic(text) {
        return Some(timestamp);
    }

    parse_legacy(text).map(day_start_millis)
}

/// `D/M[/Y]`; two-digit years mean 20YY.
fn parse_slashed(text: &str, current_year: i32) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('/').collect();
    let day = leading_int(parts.first()?)?;
    let month = leading_int(parts.get(1)?)?;
    let year = if parts.len() == 3 {
        leading_int(parts[2])?
    } else {
        i64::from(current_year)
    };
    build_date(expand_year(year), month, day)
}

fn parse_generic(text: &str) -> Option<i64> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.timestamp_millis());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(to_millis(value));
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(value) = NaiveDate::parse_from_str(text, format) {
            return Some(day_start_millis(value));
        }
    }
    let bytes = text.as_bytes();
    if bytes.len() == 7 && bytes[4] == b'-' {
        return NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
            .ok()
            .map(day_start_millis);
    }
    None
}

/// `D-MMM[-YY|-YYYY]`; an unknown month name falls back to January.
fn parse_legacy(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() < 2 {
        return None;
    }
    let day = leading_int(parts[0])?;
    let month = MONTH_ABBREVIATIONS
        .get(parts[1].trim())
        .copied()
        .unwrap_or(1);
    let year = if parts.len() == 3 {
        leading_int(parts[2])?
    } else {
        i64::from(LEGACY_DEFAULT_YEAR)
    };
    build_date(expand_year(year), i64::from(month), day)
}

fn expand_year(year: i64) -> i64 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

fn build_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )
}

/// Reads the integer prefix of `text`, ignoring leading whitespace.
fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

fn to_millis(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

/// Timestamp of 00:00:00.000 on `date`.
pub fn day_start_millis(date: NaiveDate) -> i64 {
    to_millis(date.and_time(chrono::NaiveTime::MIN))
}

/// Timestamp of 23:59:59.999 on `date`.
pub fn day_end_millis(date: NaiveDate) -> i64 {
    day_start_millis(date) + MS_PER_DAY - 1
}

/// Converts a timestamp back to its wall-clock value; `None` for the sentinel.
pub fn timestamp_to_datetime(timestamp: i64) -> Option<NaiveDateTime> {
    if timestamp == INVALID_DATE {
        return None;
    }
    DateTime::from_timestamp_millis(timestamp).map(|value| value.naive_utc())
}

/// Calendar day of a timestamp; `None` for the sentinel.
pub fn timestamp_to_date(timestamp: i64) -> Option<NaiveDate> {
    timestamp_to_datetime(timestamp).map(|value| value.date())
}

/// Calendar day of a row date, if it parses.
pub fn date_of<'a>(input: impl Into<DateInput<'a>>, current_year: i32) -> Option<NaiveDate> {
    timestamp_to_date(parse_date_value_in_year(input, current_year))
}

/// Renders a timestamp as `DD/MM/YYYY`.
pub fn format_timestamp_display(timestamp: i64) -> String {
    timestamp_to_date(timestamp)
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Renders any accepted date input as `DD/MM/YYYY`; blank or unreadable input gives "".
pub fn format_date_to_display<'a>(input: impl Into<DateInput<'a>>, clock: &dyn Clock) -> String {
    format_timestamp_display(parse_date_value(input, clock))
}

/// Turns `DD/MM/YYYY` into the `YYYY-MM-DD` form used by date pickers.
/// Anything without a slash yields today's date.
pub fn reverse_date_for_input(display: &str, clock: &dyn Clock) -> String {
    if !display.contains('/') {
        return clock.today().format("%Y-%m-%d").to_string();
    }
    let mut parts = display.split('/');
    let day = parts.next().unwrap_or_default().trim();
    let month = parts.next().unwrap_or_default().trim();
    let year = parts.next().unwrap_or_default().trim();
    format!("{year}-{month:0>2}-{day:0>2}")
}

/// Budget and grouping key, e.g. `Januari 2026`.
pub fn month_year_label(date: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[date.month0() as usize], date.year())
}

/// Compact trend label, e.g. `Jan 26`.
pub fn short_month_label(date: NaiveDate) -> String {
    format!(
        "{} {:02}",
        SHORT_MONTH_NAMES[date.month0() as usize],
        date.year().rem_euclid(100)
    )
}

/// First day of the month before `date`.
pub fn previous_month_start(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    let last_of_previous = first - Duration::days(1);
    last_of_previous.with_day(1).unwrap_or(last_of_previous)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| next - Duration::days(1))
        .unwrap_or(date)
}

/// Inclusive calendar window; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Builds a range from picker strings; blank or unreadable bounds stay open.
    pub fn from_inputs(start: &str, end: &str, clock: &dyn Clock) -> Self {
        let year = clock.today().year();
        Self {
            start: date_of(start, year),
            end: date_of(end, year),
        }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Checks `timestamp` against day-start of the lower bound and day-end of the upper.
    pub fn contains(&self, timestamp: i64) -> bool {
        if let Some(start) = self.start {
            if timestamp < day_start_millis(start) {
                return false;
            }
        }
        if let Some(end) = self.end {
            if timestamp > day_end_millis(end) {
                return false;
            }
        }
        true
    }
}
