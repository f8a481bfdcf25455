//! Timestamp and date parsing for history filtering.

use crate::constants::TIMESTAMP_FORMAT;
use crate::error::{Error, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a history timestamp (`YYYY-MM-DD HH:MM:SS`).
///
/// Also accepts the `T` separator and fractional seconds written by other
/// tools.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Which end of a day a bare date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    /// `00:00:00`.
    Start,
    /// `23:59:59`.
    End,
}

/// Parse a `--from`/`--to` argument.
///
/// A bare `YYYY-MM-DD` expands to the start or end of that day so that date
/// ranges are inclusive on both ends.
pub fn parse_date_arg(value: &str, bound: DayBound) -> Result<NaiveDateTime> {
    if let Some(ts) = parse_timestamp(value) {
        return Ok(ts);
    }

    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidDate {
            value: value.to_string(),
        }
    })?;
    let time = match bound {
        DayBound::Start => NaiveTime::MIN,
        DayBound::End => NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time))
}

/// Current local time as a naive timestamp.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Format a timestamp the way history entries store it.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// First day of `now`'s month at midnight.
pub fn start_of_month(now: NaiveDateTime) -> NaiveDateTime {
    now.date()
        .with_day(1)
        .unwrap_or_else(|| now.date())
        .and_time(NaiveTime::MIN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_timestamp() {
        let ts = parse_timestamp("2024-06-01 14:30:05").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-06-01 14:30:05");
        assert!(parse_timestamp("2024-06-01T14:30:05.123").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_date_arg_bounds() {
        let from = parse_date_arg("2024-06-01", DayBound::Start).unwrap();
        let to = parse_date_arg("2024-06-01", DayBound::End).unwrap();
        assert_eq!(format_timestamp(&from), "2024-06-01 00:00:00");
        assert_eq!(format_timestamp(&to), "2024-06-01 23:59:59");

        let exact = parse_date_arg("2024-06-01 08:00:00", DayBound::End).unwrap();
        assert_eq!(format_timestamp(&exact), "2024-06-01 08:00:00");
    }

    #[test]
    fn test_date_arg_invalid() {
        assert!(matches!(
            parse_date_arg("06/01/2024", DayBound::Start),
            Err(Error::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_start_of_month() {
        let now = parse_timestamp("2024-02-17 10:11:12").unwrap();
        assert_eq!(format_timestamp(&start_of_month(now)), "2024-02-01 00:00:00");
    }
}
