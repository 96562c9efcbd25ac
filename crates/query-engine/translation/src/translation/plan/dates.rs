//! Read the calendar date out of a date filter value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// The right-hand side of a date filter. Any time of day is dropped, and a value that
/// names no date compares as the epoch, 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLiteral(pub NaiveDate);

impl DateLiteral {
    pub fn parse(value: &str) -> DateLiteral {
        DateLiteral(parse_date(value).unwrap_or_else(|| {
            tracing::debug!(value, "unreadable date, comparing against the epoch");
            NaiveDate::default()
        }))
    }

    /// `YYYY-MM-DD`.
    pub fn to_sql_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

/// Timestamps with an offset keep the date as written in that offset.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
}
