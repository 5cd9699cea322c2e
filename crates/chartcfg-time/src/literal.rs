//! ISO-like date and time literals.
//!
//! Accepted shapes: `yyyy`, `yyyy-mm`, `yyyy-mm-dd`, `yyyy-mm-ddThh:mm[:ss[.fff]]`,
//! a date followed by a separate time token, and a bare time (today's date
//! is supplied at evaluation). Any shape carrying a time may end in `Z` or a
//! `±hh:mm` or `±hhmm` offset.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use smol_str::SmolStr;

use crate::error::TimeError;

/// A parsed literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateLiteral {
    /// Calendar date, absent for a time-only literal.
    pub date: Option<NaiveDate>,
    /// Wall-clock time, midnight when not written.
    pub time: NaiveTime,
    /// Explicit UTC offset in minutes.
    pub offset_minutes: Option<i32>,
}

impl DateLiteral {
    /// Parses a `Date` lexer token, optionally merged with a following `Time` token.
    pub fn from_date(text: &str, time: Option<&str>) -> Result<Self, TimeError> {
        let invalid = || TimeError::InvalidLiteral(SmolStr::new(text));
        let (date_part, inline_time) = match text.split_once('t') {
            Some((date_part, time_part)) => (date_part, Some(time_part)),
            None => (text, None),
        };
        if inline_time.is_some() && time.is_some() {
            return Err(TimeError::UnexpectedToken(time.map(SmolStr::new).unwrap_or_default()));
        }

        let mut fields = date_part.split('-');
        let year: i32 = parse_field(fields.next()).ok_or_else(invalid)?;
        let month: u32 = parse_field(fields.next()).ok_or_else(invalid)?;
        let day: u32 = match fields.next() {
            Some(day) => day.parse().map_err(|_| invalid())?,
            None => 1,
        };
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

        let (time, offset_minutes) = match inline_time.or(time) {
            Some(text) => parse_time(text)?,
            None => (NaiveTime::MIN, None),
        };
        Ok(Self {
            date: Some(date),
            time,
            offset_minutes,
        })
    }

    /// Parses a four digit `Number` token as January 1st of that year.
    pub fn from_year(text: &str) -> Result<Self, TimeError> {
        let invalid = || TimeError::InvalidLiteral(SmolStr::new(text));
        if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = text.parse().map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        Ok(Self {
            date: Some(date),
            time: NaiveTime::MIN,
            offset_minutes: None,
        })
    }

    /// Parses a time-only `Time` token.
    pub fn from_time(text: &str) -> Result<Self, TimeError> {
        let (time, offset_minutes) = parse_time(text)?;
        Ok(Self {
            date: None,
            time,
            offset_minutes,
        })
    }

    /// Wall-clock value, taking the date from `today` when none was written.
    #[must_use]
    pub fn local(&self, today: NaiveDate) -> NaiveDateTime {
        self.date.unwrap_or(today).and_time(self.time)
    }
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>) -> Option<T> {
    field?.parse().ok()
}

/// `hh:mm[:ss[.f+]][z|±hh[:mm]]`
fn parse_time(text: &str) -> Result<(NaiveTime, Option<i32>), TimeError> {
    let invalid = || TimeError::InvalidLiteral(SmolStr::new(text));

    let (clock, offset) = if let Some(clock) = text.strip_suffix('z') {
        (clock, Some(0))
    } else if let Some(index) = text.rfind(['+', '-']) {
        let (clock, offset) = text.split_at(index);
        (clock, Some(parse_offset(offset).ok_or_else(invalid)?))
    } else {
        (text, None)
    };

    let (clock, fraction) = match clock.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (clock, None),
    };
    let mut fields = clock.split(':');
    let hour: u32 = parse_field(fields.next()).ok_or_else(invalid)?;
    let minute: u32 = parse_field(fields.next()).ok_or_else(invalid)?;
    let second: u32 = match fields.next() {
        Some(second) => second.parse().map_err(|_| invalid())?,
        None => 0,
    };
    let nanos = match fraction {
        Some(fraction) => fraction_nanos(fraction).ok_or_else(invalid)?,
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or_else(invalid)?;
    Ok((time, offset))
}

/// `±hhmm` or `±hh:mm` as signed minutes.
fn parse_offset(text: &str) -> Option<i32> {
    let (sign, digits) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits = digits.replace(':', "");
    if digits.len() != 4 {
        return None;
    }
    let hours = digits[..2].parse::<i32>().ok()?;
    let minutes = digits[2..].parse::<i32>().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Fractional seconds; digits past nanosecond precision are dropped.
fn fraction_nanos(fraction: &str) -> Option<u32> {
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = fraction.chars().take(9).collect();
    while digits.len() < 9 {
        digits.push('0');
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_dates_start_at_the_first() {
        let month = DateLiteral::from_date("2021-02", None).unwrap();
        assert_eq!(month.date, NaiveDate::from_ymd_opt(2021, 2, 1));
        let year = DateLiteral::from_year("2020").unwrap();
        assert_eq!(year.date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(year.time, NaiveTime::MIN);
    }

    #[test]
    fn test_timestamp_with_offset_and_fraction() {
        let literal = DateLiteral::from_date("2021-03-28t02:30:00.125-05:30", None).unwrap();
        assert_eq!(literal.offset_minutes, Some(-330));
        assert_eq!(
            literal.time,
            NaiveTime::from_hms_milli_opt(2, 30, 0, 125).unwrap()
        );
    }

    #[test]
    fn test_separate_time_token() {
        let literal = DateLiteral::from_date("2021-03-28", Some("10:15z")).unwrap();
        assert_eq!(literal.offset_minutes, Some(0));
        assert_eq!(literal.time, NaiveTime::from_hms_opt(10, 15, 0).unwrap());
    }

    #[test]
    fn test_out_of_range_components() {
        assert_eq!(
            DateLiteral::from_date("2021-02-30", None),
            Err(TimeError::InvalidLiteral("2021-02-30".into()))
        );
        assert!(DateLiteral::from_time("25:00").is_err());
        assert!(DateLiteral::from_date("2021-13", None).is_err());
    }

    #[test]
    fn test_time_only_takes_today() {
        let literal = DateLiteral::from_time("08:00").unwrap();
        let today = NaiveDate::from_ymd_opt(2021, 6, 10).unwrap();
        assert_eq!(
            literal.local(today),
            today.and_hms_opt(8, 0, 0).unwrap()
        );
    }
}
