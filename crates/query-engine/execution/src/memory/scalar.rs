//! Typed values, read from JSON records and request parameters.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use query_engine_metadata::metadata::ScalarType;
use query_engine_translation::translation::plan::parse_date;

use crate::error::QueryError;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A non-null value of a column, in the column's type.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Scalar {
    Boolean(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Scalar {
    /// Read a value stored in a record. `null` has no scalar.
    pub fn from_json(
        value: &serde_json::Value,
        scalar_type: ScalarType,
    ) -> Result<Option<Scalar>, QueryError> {
        match value {
            serde_json::Value::Null => Ok(None),
            other => Scalar::parse(&json_text(other), scalar_type).map(Some),
        }
    }

    /// Read a value as PostgreSQL reads a text parameter cast to the given type.
    #[allow(clippy::cast_precision_loss)]
    pub fn parse(value: &str, scalar_type: ScalarType) -> Result<Scalar, QueryError> {
        let invalid = || QueryError::InvalidValue {
            value: value.to_string(),
            r#type: scalar_type.to_string(),
        };
        match scalar_type {
            ScalarType::Boolean => parse_boolean(value).map(Scalar::Boolean).ok_or_else(invalid),
            ScalarType::Smallint | ScalarType::Integer | ScalarType::Bigint => value
                .trim()
                .parse::<i64>()
                .map(|number| Scalar::Number(number as f64))
                .map_err(|_| invalid()),
            ScalarType::Real | ScalarType::DoublePrecision | ScalarType::Numeric => value
                .trim()
                .parse::<f64>()
                .map(Scalar::Number)
                .map_err(|_| invalid()),
            ScalarType::Date => parse_date(value).map(Scalar::Date).ok_or_else(invalid),
            ScalarType::TimestampWithTimeZone | ScalarType::TimestampWithoutTimeZone => {
                parse_timestamp(value, scalar_type)
                    .map(Scalar::Timestamp)
                    .ok_or_else(invalid)
            }
            ScalarType::Character
            | ScalarType::CharacterVarying
            | ScalarType::Text
            | ScalarType::Uuid
            | ScalarType::Any => Ok(Scalar::Text(value.to_string())),
        }
    }

    /// The calendar date of the value, as `CAST(value AS date)` would give it.
    pub fn date(&self) -> Result<NaiveDate, QueryError> {
        match self {
            Scalar::Date(date) => Ok(*date),
            Scalar::Timestamp(timestamp) => Ok(timestamp.date()),
            Scalar::Text(text) => {
                parse_date(text).ok_or_else(|| QueryError::InvalidDate(text.clone()))
            }
            Scalar::Boolean(boolean) => Err(QueryError::InvalidDate(boolean.to_string())),
            Scalar::Number(number) => Err(QueryError::InvalidDate(number.to_string())),
        }
    }

    /// `None` when the values cannot be ordered.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        self.partial_cmp(other)
    }
}

/// The value as `CAST(value AS text)` would render it.
pub fn text_of(
    value: &serde_json::Value,
    scalar_type: ScalarType,
) -> Result<Option<String>, QueryError> {
    Ok(match Scalar::from_json(value, scalar_type)? {
        None => None,
        Some(Scalar::Boolean(boolean)) => Some(boolean.to_string()),
        Some(Scalar::Date(date)) => Some(date.format("%Y-%m-%d").to_string()),
        Some(Scalar::Timestamp(timestamp)) => {
            Some(timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        Some(Scalar::Number(_) | Scalar::Text(_)) => Some(json_text(value)),
    })
}

/// Strings without their quotes, anything else as JSON.
pub fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Timestamps with an offset are converted to UTC. Dates alone are read as midnight.
fn parse_timestamp(value: &str, scalar_type: ScalarType) -> Option<NaiveDateTime> {
    let value = value.trim();
    if scalar_type == ScalarType::TimestampWithTimeZone {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
            return Some(datetime.naive_utc());
        }
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
