//! Wall-clock instants that keep their UTC offset consistent with a zone.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, TimeZone};

use crate::error::TimeError;
use crate::unit::{self, TimeUnit};

/// Wall-clock components plus the UTC offset they are interpreted with.
///
/// Every mutation of the wall clock re-derives the offset for the zone, so
/// the pair always denotes one concrete instant.
#[derive(Debug, Clone)]
pub struct ZonedInstant<Z: TimeZone> {
    local: NaiveDateTime,
    offset_minutes: i32,
    zone: Z,
}

impl<Z: TimeZone> ZonedInstant<Z> {
    /// The instant `utc` seen in `zone`.
    pub fn from_utc(utc: NaiveDateTime, zone: Z) -> Result<Self, TimeError> {
        let offset_minutes = offset_at(&zone, utc);
        Ok(Self {
            local: add_minutes(utc, offset_minutes)?,
            offset_minutes,
            zone,
        })
    }

    /// Interprets `local` as wall-clock time in `zone`.
    pub fn from_local(local: NaiveDateTime, zone: Z) -> Result<Self, TimeError> {
        let offset_minutes = offset_at(&zone, local);
        let mut instant = Self {
            local,
            offset_minutes,
            zone,
        };
        instant.guarantee_correct_offset()?;
        Ok(instant)
    }

    /// Wall-clock components.
    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    /// Offset from UTC in minutes.
    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    /// Replaces the wall clock and re-derives the offset.
    pub fn set_local(&mut self, local: NaiveDateTime) -> Result<(), TimeError> {
        self.local = local;
        self.guarantee_correct_offset()
    }

    /// Moves the wall clock by `count` units.
    pub fn shift(&mut self, unit: TimeUnit, count: f64) -> Result<(), TimeError> {
        let local = unit::shift(self.local, unit, count)?;
        self.set_local(local)
    }

    /// The underlying UTC timestamp.
    pub fn utc(&self) -> Result<NaiveDateTime, TimeError> {
        add_minutes(self.local, -self.offset_minutes)
    }

    /// The instant as an offset-aware timestamp.
    pub fn to_fixed(&self) -> Result<DateTime<FixedOffset>, TimeError> {
        let offset = FixedOffset::east_opt(self.offset_minutes * 60).ok_or(TimeError::OutOfRange)?;
        Ok(offset.from_utc_datetime(&self.utc()?))
    }

    /// Recomputes the offset after the wall clock changed.
    ///
    /// The prior offset gives a first guess of the UTC instant. When the zone
    /// disagrees with that guess the instant is re-derived once more; if the
    /// two candidates still differ the wall time falls in a transition and the
    /// larger offset wins.
    fn guarantee_correct_offset(&mut self) -> Result<(), TimeError> {
        let prior = self.offset_minutes;
        let first = offset_at(&self.zone, add_minutes(self.local, -prior)?);
        if first == prior {
            return Ok(());
        }
        let second = offset_at(&self.zone, add_minutes(self.local, -first)?);
        self.offset_minutes = if first == second {
            first
        } else {
            first.max(second)
        };
        Ok(())
    }
}

/// `time` moved by `count` minutes, or `OutOfRange` past the calendar limits.
pub(crate) fn add_minutes(time: NaiveDateTime, count: i32) -> Result<NaiveDateTime, TimeError> {
    time.checked_add_signed(TimeDelta::minutes(i64::from(count)))
        .ok_or(TimeError::OutOfRange)
}

fn offset_at<Z: TimeZone>(zone: &Z, utc: NaiveDateTime) -> i32 {
    zone.offset_from_utc_datetime(&utc).fix().local_minus_utc() / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Europe::Berlin;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_summer_and_winter_offsets() {
        assert_eq!(
            ZonedInstant::from_local(local(2021, 7, 1, 12, 0), Berlin)
                .unwrap()
                .offset_minutes(),
            120
        );
        assert_eq!(
            ZonedInstant::from_local(local(2021, 1, 1, 12, 0), Berlin)
                .unwrap()
                .offset_minutes(),
            60
        );
    }

    #[test]
    fn test_day_shift_across_transition_keeps_wall_clock() {
        let mut instant = ZonedInstant::from_local(local(2021, 3, 27, 12, 0), Berlin).unwrap();
        assert_eq!(instant.offset_minutes(), 60);
        instant.shift(TimeUnit::Day, 1.0).unwrap();
        assert_eq!(instant.local(), local(2021, 3, 28, 12, 0));
        assert_eq!(instant.offset_minutes(), 120);
        assert_eq!(instant.utc().unwrap(), local(2021, 3, 28, 10, 0));
    }

    #[test]
    fn test_missing_local_time_takes_larger_offset() {
        // 02:30 does not exist in Berlin on 2021-03-28.
        let instant = ZonedInstant::from_local(local(2021, 3, 28, 2, 30), Berlin).unwrap();
        assert_eq!(instant.offset_minutes(), 120);
        assert_eq!(instant.utc().unwrap(), local(2021, 3, 28, 0, 30));
    }

    #[test]
    fn test_from_utc() {
        let instant = ZonedInstant::from_utc(local(2021, 7, 1, 10, 0), Berlin).unwrap();
        assert_eq!(instant.local(), local(2021, 7, 1, 12, 0));
        assert_eq!(
            instant.to_fixed().unwrap().to_rfc3339(),
            "2021-07-01T12:00:00+02:00"
        );
    }

    #[test]
    fn test_offset_near_calendar_limit_is_out_of_range() {
        use chrono_tz::America::New_York;

        // Wall clock at the last representable minute; UTC lies five hours later.
        let last = NaiveDateTime::MAX;
        assert_eq!(
            ZonedInstant::from_local(last, New_York).unwrap_err(),
            TimeError::OutOfRange
        );
        let mut instant = ZonedInstant::from_local(local(2021, 1, 1, 12, 0), New_York).unwrap();
        assert_eq!(instant.set_local(last), Err(TimeError::OutOfRange));
    }
}
