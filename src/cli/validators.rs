//! CLI argument validators.

use crate::utils::date::{DayBound, parse_date_arg};
use chrono::NaiveDateTime;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Parse a number and check it lies in `range`.
fn parse_in_range<T>(s: &str, range: RangeInclusive<T>, name: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display,
{
    let value: T = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !range.contains(&value) {
        return Err(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        ));
    }

    Ok(value)
}

/// Parse a confidence threshold (0.0-1.0).
pub fn parse_confidence(s: &str) -> Result<f32, String> {
    parse_in_range(s, 0.0..=1.0, "confidence")
}

/// Parse a latitude (-90.0 to 90.0).
pub fn parse_latitude(s: &str) -> Result<f64, String> {
    parse_in_range(s, -90.0..=90.0, "latitude")
}

/// Parse a longitude (-180.0 to 180.0).
pub fn parse_longitude(s: &str) -> Result<f64, String> {
    parse_in_range(s, -180.0..=180.0, "longitude")
}

/// Parse a maximum image side in pixels.
pub fn parse_max_dimension(s: &str) -> Result<u32, String> {
    parse_in_range(s, 1..=u32::MAX, "max dimension")
}

/// Parse a `--from` date; a bare date means the start of that day.
pub fn parse_from_date(s: &str) -> Result<NaiveDateTime, String> {
    parse_date_arg(s, DayBound::Start).map_err(|e| e.to_string())
}

/// Parse a `--to` date; a bare date means the end of that day.
pub fn parse_to_date(s: &str) -> Result<NaiveDateTime, String> {
    parse_date_arg(s, DayBound::End).map_err(|e| e.to_string())
}
