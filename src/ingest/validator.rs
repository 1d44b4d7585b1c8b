use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::Table;
use crate::error::ValidationError;
use crate::models::{DataPoint, Series};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Calendar years accepted from uploads; anything outside is unreadable
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1677..=2262;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
];

/// Build a clean series from the designated date and value columns.
///
/// Rows whose date or value cannot be read are dropped, not reported.
/// No minimum length is enforced; that is the forecaster's call.
pub fn validate(table: &Table, date_field: &str, value_field: &str) -> Result<Series, ValidationError> {
    if !table.has_column(date_field) {
        return Err(ValidationError::MissingColumn(date_field.to_string()));
    }
    if !table.has_column(value_field) {
        return Err(ValidationError::MissingColumn(value_field.to_string()));
    }
    if date_field == value_field {
        return Err(ValidationError::SameColumn(date_field.to_string()));
    }

    let points: Vec<DataPoint> = table
        .rows
        .iter()
        .filter_map(|row| {
            let timestamp = row.get(date_field).map(String::as_str).and_then(parse_timestamp)?;
            let value = row.get(value_field).map(String::as_str).and_then(parse_value)?;
            Some(DataPoint { timestamp, value })
        })
        .collect();

    let dropped = table.rows.len() - points.len();
    if dropped > 0 {
        tracing::warn!(dropped, kept = points.len(), "Dropped rows with missing or unreadable date/value");
    }

    Ok(Series::new(points))
}

/// Parse a calendar date or date-time; naive values are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any_timestamp(raw).filter(|ts| YEAR_RANGE.contains(&ts.year()))
}

fn parse_any_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    None
}

/// Parse a numeric cell, tolerating currency prefixes and thousands separators
pub fn parse_value(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_start_matches(['$', '€', '£']).replace(',', "");
    let value = s.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
