use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::i18n::Locale;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date value is empty")]
    Empty,
    #[error("unrecognized date '{0}': expected YYYY-MM-DD or an ISO 8601 timestamp")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateStyle {
    /// `February 7, 2026`
    #[default]
    Long,
    /// `Feb 7, 2026`
    Short,
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` or an RFC 3339 timestamp.
/// Timestamps keep their written wall-clock value.
pub fn parse_iso(value: &str) -> Result<NaiveDateTime, DateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DateError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DateError::Unrecognized(trimmed.to_string()));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_local());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    Err(DateError::Unrecognized(trimmed.to_string()))
}

/// Human date string for `locale`. Empty input yields `N/A` and anything
/// unparseable yields the localized "date format error" text.
pub fn format_date(value: &str, locale: Locale, style: DateStyle) -> String {
    match parse_iso(value) {
        Ok(parsed) => format_naive(parsed.date(), locale, style),
        Err(DateError::Empty) => locale.not_available().to_string(),
        Err(DateError::Unrecognized(_)) => locale.date_format_error().to_string(),
    }
}

pub fn format_naive(date: NaiveDate, locale: Locale, style: DateStyle) -> String {
    match (locale, style) {
        (Locale::ZhTw, _) => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
        (Locale::En, DateStyle::Long) => date.format("%B %-d, %Y").to_string(),
        (Locale::En, DateStyle::Short) => date.format("%b %-d, %Y").to_string(),
    }
}

/// Nights between two dates: `ceil(|end - start| / 1 day)`. Argument order
/// does not matter.
pub fn nights_between(start: &str, end: &str) -> Result<i64, DateError> {
    let start = parse_iso(start)?;
    let end = parse_iso(end)?;
    let seconds = (end - start).num_seconds().abs();
    Ok(ceil_days(seconds))
}

/// Inclusive day count shown in the page header: both the first and the
/// last day of the trip count.
pub fn trip_days(start: &str, end: &str) -> Result<i64, DateError> {
    let start = parse_iso(start)?;
    let end = parse_iso(end)?;
    Ok(ceil_days((end - start).num_seconds()) + 1)
}

/// Fractional days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY as f64
}

fn ceil_days(seconds: i64) -> i64 {
    -((-seconds).div_euclid(SECONDS_PER_DAY))
}
