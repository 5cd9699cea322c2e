//! Time units, intervals, and wall-clock shifting.

use chrono::{DateTime, Months, NaiveDateTime, TimeDelta, Utc};
use smol_str::SmolStr;
use std::fmt;

use crate::error::TimeError;

/// Units accepted in interval arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeUnit {
    /// 1/1000 of a second.
    Millisecond,
    /// Second.
    Second,
    /// Minute.
    Minute,
    /// Hour.
    Hour,
    /// Calendar day.
    Day,
    /// Seven calendar days.
    Week,
    /// Calendar month.
    Month,
    /// Three calendar months.
    Quarter,
    /// Calendar year.
    Year,
}

const UNIT_NAMES: &[(&str, TimeUnit)] = &[
    ("millisecond", TimeUnit::Millisecond),
    ("second", TimeUnit::Second),
    ("minute", TimeUnit::Minute),
    ("hour", TimeUnit::Hour),
    ("day", TimeUnit::Day),
    ("week", TimeUnit::Week),
    ("month", TimeUnit::Month),
    ("quarter", TimeUnit::Quarter),
    ("year", TimeUnit::Year),
];

impl TimeUnit {
    /// Resolves a singular or plural unit name (`day`, `days`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let singular = name.strip_suffix('s').unwrap_or(name);
        UNIT_NAMES
            .iter()
            .find(|(unit_name, _)| *unit_name == singular || *unit_name == name)
            .map(|(_, unit)| *unit)
    }

    /// Singular unit name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        UNIT_NAMES
            .iter()
            .find(|(_, unit)| *unit == self)
            .map_or("", |(name, _)| name)
    }

    /// Length in milliseconds for units with a fixed wall-clock length.
    #[must_use]
    pub fn fixed_millis(self) -> Option<i64> {
        match self {
            Self::Millisecond => Some(1),
            Self::Second => Some(1_000),
            Self::Minute => Some(60_000),
            Self::Hour => Some(3_600_000),
            Self::Day => Some(86_400_000),
            Self::Week => Some(604_800_000),
            Self::Month | Self::Quarter | Self::Year => None,
        }
    }

    /// Number of months for calendar units.
    fn months(self) -> Option<i64> {
        match self {
            Self::Month => Some(1),
            Self::Quarter => Some(3),
            Self::Year => Some(12),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shifts a wall-clock time by `count` units.
///
/// Months, quarters and years move the calendar fields (clamping the day of
/// month); the remaining units move the wall clock by their fixed length.
pub fn shift(local: NaiveDateTime, unit: TimeUnit, count: f64) -> Result<NaiveDateTime, TimeError> {
    if let Some(per_unit) = unit.months() {
        if count.fract() != 0.0 {
            return Err(TimeError::FractionalCount(unit.as_str().into()));
        }
        #[allow(clippy::cast_possible_truncation)]
        let months = (count as i64)
            .checked_mul(per_unit)
            .ok_or(TimeError::OutOfRange)?;
        let magnitude = Months::new(u32::try_from(months.unsigned_abs()).map_err(|_| TimeError::OutOfRange)?);
        let shifted = if months >= 0 {
            local.checked_add_months(magnitude)
        } else {
            local.checked_sub_months(magnitude)
        };
        return shifted.ok_or(TimeError::OutOfRange);
    }

    let per_unit = unit.fixed_millis().ok_or(TimeError::OutOfRange)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let millis = (count * per_unit as f64).round() as i64;
    let delta = TimeDelta::try_milliseconds(millis).ok_or(TimeError::OutOfRange)?;
    local.checked_add_signed(delta).ok_or(TimeError::OutOfRange)
}

/// `<count> <unit>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Number of units; may be fractional for fixed-length units.
    pub count: f64,
    /// The unit.
    pub unit: TimeUnit,
}

impl Interval {
    /// Length of the interval measured forward from `reference`.
    ///
    /// Months and years vary in length, so the answer depends on where the
    /// interval starts.
    pub fn to_millis(&self, reference: DateTime<Utc>) -> Result<i64, TimeError> {
        let start = reference.naive_utc();
        let end = shift(start, self.unit, self.count)?;
        Ok((end - start).num_milliseconds())
    }
}

/// A parsed interval setting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalValue {
    /// The literal `all`.
    All,
    /// A counted interval.
    Interval(Interval),
}

/// Parses `<count><unit>`, `<count> [*] <unit>` or `all`.
pub fn parse_interval(text: &str) -> Result<IntervalValue, TimeError> {
    let text = text.trim().to_ascii_lowercase();
    if text == "all" {
        return Ok(IntervalValue::All);
    }
    let invalid = || TimeError::InvalidInterval(SmolStr::new(&text));

    let digits_end = text
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(text.len());
    let (number, rest) = text.split_at(digits_end);
    if number.is_empty() {
        return Err(invalid());
    }
    let count: f64 = number.parse().map_err(|_| invalid())?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('*').unwrap_or(rest).trim();
    let unit = TimeUnit::from_name(rest).ok_or_else(invalid)?;
    Ok(IntervalValue::Interval(Interval { count, unit }))
}
