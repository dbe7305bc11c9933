//! Wall-clock time helpers.
//!
//! Appointments carry no timezone: every timestamp is a local wall-clock
//! `NaiveDateTime`. The API speaks `YYYY-MM-DDTHH:MM:SS`; on input we also
//! accept fractional seconds, a trailing `Z`, an explicit offset (the wall
//! clock as written is kept), minute precision and bare dates.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Wire format for timestamps sent to the API.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an API timestamp. Returns `None` for anything unrecognised.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    let bare = s.strip_suffix('Z').unwrap_or(s);
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(bare, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(bare, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(WIRE_FORMAT).to_string()
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last date touched by the half-open interval `[start, end)`.
///
/// An interval ending exactly at midnight does not touch the following day.
pub fn last_covered_date(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDate {
    if end <= start {
        return start.date();
    }
    (end - Duration::nanoseconds(1)).date()
}

/// First date of the week containing `date`, for a given first weekday.
pub fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    date.week(week_start).first_day()
}

/// Full English weekday name, as the API expects in `daysOfWeek`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Serde adapter for `NaiveDateTime` in the API wire format.
pub mod serde_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn parses_wire_format() {
        assert_eq!(parse_timestamp("2025-01-06T10:00:00"), Some(dt("2025-01-06T10:00:00")));
    }

    #[test]
    fn parses_fractional_and_zulu() {
        assert_eq!(
            parse_timestamp("2025-01-06T10:00:00.250Z"),
            Some(dt("2025-01-06T10:00:00") + Duration::milliseconds(250))
        );
        assert_eq!(parse_timestamp("2025-01-06T10:00:00Z"), Some(dt("2025-01-06T10:00:00")));
    }

    #[test]
    fn offset_keeps_written_wall_clock() {
        assert_eq!(
            parse_timestamp("2025-01-06T10:00:00+05:30"),
            Some(dt("2025-01-06T10:00:00"))
        );
    }

    #[test]
    fn parses_minutes_and_dates() {
        assert_eq!(parse_timestamp("2025-01-06T10:30"), Some(dt("2025-01-06T10:30:00")));
        assert_eq!(parse_timestamp("2025-01-20"), Some(dt("2025-01-20T00:00:00")));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2025-13-01T00:00:00"), None);
    }

    #[test]
    fn midnight_end_does_not_touch_next_day() {
        let start = dt("2025-01-01T23:00:00");
        let end = dt("2025-01-02T00:00:00");
        assert_eq!(last_covered_date(start, end), start.date());
        assert_eq!(last_covered_date(start, dt("2025-01-02T00:01:00")), end.date());
    }

    #[test]
    fn week_start_respects_convention() {
        let wed = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        assert_eq!(week_start_of(wed, Weekday::Sun), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(week_start_of(wed, Weekday::Mon), NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    }

    #[test]
    fn weekday_names_round_trip_through_chrono() {
        for day in [Weekday::Mon, Weekday::Wed, Weekday::Sun] {
            assert_eq!(weekday_name(day).parse::<Weekday>().unwrap(), day);
        }
    }
}
