//! Shared date/time decomposition used by rules and validators alike.
//!
//! Stored values are formatted strings: `yyyy-mm-dd`, optionally followed by
//! a space and `HH:MM`. Parsing is lenient about widths but strict about the
//! calendar: `2021-02-30` is not a date.

use chrono::{NaiveDate, NaiveDateTime};

/// The date portion of a stored value (everything before the first space).
pub fn date_part(value: &str) -> &str {
    value.split(' ').next().unwrap_or("")
}

/// The time portion of a stored value (the token after the first space).
pub fn time_part(value: &str) -> &str {
    value.split(' ').nth(1).unwrap_or("")
}

/// Year component of a `yyyy-mm-dd` string, empty if the value is too short.
pub fn year_from(value: &str) -> &str {
    date_component(value, 0)
}

/// Month component of a `yyyy-mm-dd` string.
pub fn month_from(value: &str) -> &str {
    date_component(value, 1)
}

/// Day component of a `yyyy-mm-dd` string.
pub fn day_from(value: &str) -> &str {
    date_component(value, 2)
}

fn date_component(value: &str, index: usize) -> &str {
    if value.len() > 5 {
        value.split('-').nth(index).unwrap_or("")
    } else {
        ""
    }
}

/// Hour component, zero-padded to two digits. Accepts either a bare `HH:MM`
/// or a full `yyyy-mm-dd HH:MM` value.
pub fn hour_part(value: &str) -> String {
    let time = if value.len() > 9 { time_part(value) } else { value };
    let hour = time.split(':').next().unwrap_or("");
    let padded = format!("0{hour}");
    // Suffix over chars, not bytes: the hour token is user input and may
    // hold multi-byte characters.
    let skip = padded.chars().count().saturating_sub(2);
    padded.chars().skip(skip).collect()
}

/// Minute component. Accepts either a bare `HH:MM` or a full
/// `yyyy-mm-dd HH:MM` value.
pub fn minute_part(value: &str) -> String {
    let time = if value.len() > 9 { time_part(value) } else { value };
    time.split(':').nth(1).unwrap_or("").to_string()
}

/// Parse a stored value as a date (with an optional time portion).
///
/// Returns `None` when year/month/day are missing, when a present time
/// portion has an unparsable hour or minute, or when the calendar date does
/// not exist.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let date = date_part(value);
    let time = if value.contains(':') {
        Some(time_part(value))
    } else {
        None
    };
    convert_to_datetime(date, time)
}

/// Combine a date string and an optional `HH:MM` time string.
pub fn convert_to_datetime(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let year = year_from(date);
    let month = month_from(date);
    let day = day_from(date);

    if year.is_empty() || month.is_empty() || day.is_empty() {
        return None;
    }

    let (hour, minute) = match time {
        Some(time) => {
            let hour: u32 = hour_part(time).parse().ok()?;
            let minute: u32 = minute_part(time).parse().ok()?;
            (hour, minute)
        }
        None => (0, 0),
    };

    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_date_only() {
        let parsed = parse_datetime("2021-06-14").unwrap();
        assert_eq!(
            (parsed.year(), parsed.month(), parsed.day()),
            (2021, 6, 14)
        );
        assert_eq!((parsed.hour(), parsed.minute()), (0, 0));
    }

    #[test]
    fn parses_date_and_time() {
        let parsed = parse_datetime("2021-06-14 9:05").unwrap();
        assert_eq!((parsed.hour(), parsed.minute()), (9, 5));
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(parse_datetime("2021-02-30").is_none());
        assert!(parse_datetime("2021-13-01").is_none());
    }

    #[test]
    fn rejects_missing_components() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("2021").is_none());
        assert!(parse_datetime("2021-06").is_none());
    }

    #[test]
    fn rejects_unparsable_time() {
        assert!(parse_datetime("2021-06-14 xx:05").is_none());
        assert!(parse_datetime("2021-06-14 09:yy").is_none());
    }

    #[test]
    fn non_ascii_time_tokens_are_not_a_date() {
        assert!(parse_datetime("2021-06-14 日:05").is_none());
        assert!(parse_datetime("2021-06-14 09:半").is_none());
        assert_eq!(hour_part("日:05"), "0日");
    }

    #[test]
    fn part_accessors() {
        assert_eq!(year_from("2021-06-14"), "2021");
        assert_eq!(month_from("2021-06-14"), "06");
        assert_eq!(day_from("2021-06-14"), "14");
        assert_eq!(hour_part("2021-06-14 9:30"), "09");
        assert_eq!(minute_part("2021-06-14 9:30"), "30");
        assert_eq!(hour_part("14:45"), "14");
        assert_eq!(minute_part("14:45"), "45");
    }

    #[test]
    fn round_trips_valid_triples() {
        let value = format!("{:04}-{:02}-{:02}", 1999, 12, 31);
        let parsed = parse_datetime(&value).unwrap();
        assert_eq!(
            (parsed.year(), parsed.month(), parsed.day()),
            (1999, 12, 31)
        );
    }
}
