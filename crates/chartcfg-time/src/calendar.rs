//! Calendar keywords.
//!
//! Each keyword is a pure function of the current wall-clock time in the
//! target zone. Saturdays and Sundays are vacation days; every other day is a
//! working day.

use chrono::{
    Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday,
};

/// A symbolic date resolved relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarKeyword {
    /// The current instant.
    Now,
    /// Start of the current minute.
    CurrentMinute,
    /// Start of the previous minute.
    PreviousMinute,
    /// Start of the next minute.
    NextMinute,
    /// Start of the current hour.
    CurrentHour,
    /// Start of the previous hour.
    PreviousHour,
    /// Start of the next hour.
    NextHour,
    /// Today at midnight.
    CurrentDay,
    /// Yesterday at midnight.
    PreviousDay,
    /// Tomorrow at midnight.
    NextDay,
    /// Monday of this week at midnight.
    CurrentWeek,
    /// Monday of last week.
    PreviousWeek,
    /// Monday of next week.
    NextWeek,
    /// First day of this month.
    CurrentMonth,
    /// First day of last month.
    PreviousMonth,
    /// First day of next month.
    NextMonth,
    /// First day of this quarter.
    CurrentQuarter,
    /// First day of last quarter.
    PreviousQuarter,
    /// First day of next quarter.
    NextQuarter,
    /// January 1st of this year.
    CurrentYear,
    /// January 1st of last year.
    PreviousYear,
    /// January 1st of next year.
    NextYear,
    /// First day of this month.
    FirstDay,
    /// Last day of this month.
    LastDay,
    /// First working day of this month.
    FirstWorkingDay,
    /// Last working day of this month.
    LastWorkingDay,
    /// First vacation day of this month.
    FirstVacationDay,
    /// Last vacation day of this month.
    LastVacationDay,
    /// The working day before today.
    PreviousWorkingDay,
    /// The working day after today.
    NextWorkingDay,
    /// The vacation day before today.
    PreviousVacationDay,
    /// The vacation day after today.
    NextVacationDay,
    /// Most recent occurrence (today included) of a weekday.
    Weekday(Weekday),
}

const KEYWORDS: &[(&str, CalendarKeyword)] = &[
    ("now", CalendarKeyword::Now),
    ("current_minute", CalendarKeyword::CurrentMinute),
    ("previous_minute", CalendarKeyword::PreviousMinute),
    ("next_minute", CalendarKeyword::NextMinute),
    ("current_hour", CalendarKeyword::CurrentHour),
    ("previous_hour", CalendarKeyword::PreviousHour),
    ("next_hour", CalendarKeyword::NextHour),
    ("current_day", CalendarKeyword::CurrentDay),
    ("today", CalendarKeyword::CurrentDay),
    ("previous_day", CalendarKeyword::PreviousDay),
    ("yesterday", CalendarKeyword::PreviousDay),
    ("next_day", CalendarKeyword::NextDay),
    ("tomorrow", CalendarKeyword::NextDay),
    ("current_week", CalendarKeyword::CurrentWeek),
    ("previous_week", CalendarKeyword::PreviousWeek),
    ("next_week", CalendarKeyword::NextWeek),
    ("current_month", CalendarKeyword::CurrentMonth),
    ("previous_month", CalendarKeyword::PreviousMonth),
    ("next_month", CalendarKeyword::NextMonth),
    ("current_quarter", CalendarKeyword::CurrentQuarter),
    ("previous_quarter", CalendarKeyword::PreviousQuarter),
    ("next_quarter", CalendarKeyword::NextQuarter),
    ("current_year", CalendarKeyword::CurrentYear),
    ("previous_year", CalendarKeyword::PreviousYear),
    ("next_year", CalendarKeyword::NextYear),
    ("first_day", CalendarKeyword::FirstDay),
    ("last_day", CalendarKeyword::LastDay),
    ("first_working_day", CalendarKeyword::FirstWorkingDay),
    ("last_working_day", CalendarKeyword::LastWorkingDay),
    ("first_vacation_day", CalendarKeyword::FirstVacationDay),
    ("last_vacation_day", CalendarKeyword::LastVacationDay),
    ("previous_working_day", CalendarKeyword::PreviousWorkingDay),
    ("next_working_day", CalendarKeyword::NextWorkingDay),
    ("previous_vacation_day", CalendarKeyword::PreviousVacationDay),
    ("next_vacation_day", CalendarKeyword::NextVacationDay),
    ("monday", CalendarKeyword::Weekday(Weekday::Mon)),
    ("mon", CalendarKeyword::Weekday(Weekday::Mon)),
    ("tuesday", CalendarKeyword::Weekday(Weekday::Tue)),
    ("tue", CalendarKeyword::Weekday(Weekday::Tue)),
    ("wednesday", CalendarKeyword::Weekday(Weekday::Wed)),
    ("wed", CalendarKeyword::Weekday(Weekday::Wed)),
    ("thursday", CalendarKeyword::Weekday(Weekday::Thu)),
    ("thu", CalendarKeyword::Weekday(Weekday::Thu)),
    ("friday", CalendarKeyword::Weekday(Weekday::Fri)),
    ("fri", CalendarKeyword::Weekday(Weekday::Fri)),
    ("saturday", CalendarKeyword::Weekday(Weekday::Sat)),
    ("sat", CalendarKeyword::Weekday(Weekday::Sat)),
    ("sunday", CalendarKeyword::Weekday(Weekday::Sun)),
    ("sun", CalendarKeyword::Weekday(Weekday::Sun)),
];

impl CalendarKeyword {
    /// Looks up a keyword by its (lowercase) spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, keyword)| *keyword)
    }

    /// Resolves the keyword against the wall-clock time `now`.
    #[must_use]
    pub fn resolve(self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        let hour = minute.with_minute(0).unwrap_or(minute);
        match self {
            Self::Now => now,
            Self::CurrentMinute => minute,
            Self::PreviousMinute => add_delta(minute, TimeDelta::minutes(-1)),
            Self::NextMinute => add_delta(minute, TimeDelta::minutes(1)),
            Self::CurrentHour => hour,
            Self::PreviousHour => add_delta(hour, TimeDelta::hours(-1)),
            Self::NextHour => add_delta(hour, TimeDelta::hours(1)),
            Self::CurrentDay => midnight(today),
            Self::PreviousDay => midnight(sub_days(today, 1)),
            Self::NextDay => midnight(add_days(today, 1)),
            Self::CurrentWeek => midnight(week_start(today)),
            Self::PreviousWeek => midnight(sub_days(week_start(today), 7)),
            Self::NextWeek => midnight(add_days(week_start(today), 7)),
            Self::CurrentMonth | Self::FirstDay => midnight(month_start(today)),
            Self::PreviousMonth => midnight(sub_months(month_start(today), 1)),
            Self::NextMonth => midnight(add_months(month_start(today), 1)),
            Self::CurrentQuarter => midnight(quarter_start(today)),
            Self::PreviousQuarter => midnight(sub_months(quarter_start(today), 3)),
            Self::NextQuarter => midnight(add_months(quarter_start(today), 3)),
            Self::CurrentYear => midnight(year_start(today)),
            Self::PreviousYear => midnight(sub_months(year_start(today), 12)),
            Self::NextYear => midnight(add_months(year_start(today), 12)),
            Self::LastDay => midnight(month_end(today)),
            Self::FirstWorkingDay => midnight(roll_forward(month_start(today), is_working_day)),
            Self::LastWorkingDay => midnight(roll_back(month_end(today), is_working_day)),
            Self::FirstVacationDay => midnight(roll_forward(month_start(today), is_vacation_day)),
            Self::LastVacationDay => midnight(roll_back(month_end(today), is_vacation_day)),
            Self::PreviousWorkingDay => midnight(roll_back(sub_days(today, 1), is_working_day)),
            Self::NextWorkingDay => midnight(roll_forward(add_days(today, 1), is_working_day)),
            Self::PreviousVacationDay => {
                midnight(roll_back(sub_days(today, 1), is_vacation_day))
            }
            Self::NextVacationDay => midnight(roll_forward(add_days(today, 1), is_vacation_day)),
            Self::Weekday(weekday) => {
                let back = (7 + today.weekday().num_days_from_monday()
                    - weekday.num_days_from_monday())
                    % 7;
                midnight(sub_days(today, u64::from(back)))
            }
        }
    }
}

/// Saturday or Sunday.
#[must_use]
pub fn is_vacation_day(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday through Friday.
#[must_use]
pub fn is_working_day(date: NaiveDate) -> bool {
    !is_vacation_day(date)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn add_delta(time: NaiveDateTime, delta: TimeDelta) -> NaiveDateTime {
    time.checked_add_signed(delta).unwrap_or(time)
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

fn sub_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    sub_days(date, u64::from(date.weekday().num_days_from_monday()))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    sub_days(add_months(month_start(date), 1), 1)
}

fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn roll_forward(mut date: NaiveDate, accept: fn(NaiveDate) -> bool) -> NaiveDate {
    while !accept(date) {
        date = add_days(date, 1);
    }
    date
}

fn roll_back(mut date: NaiveDate, accept: fn(NaiveDate) -> bool) -> NaiveDate {
    while !accept(date) {
        date = sub_days(date, 1);
    }
    date
}
