//! Civil calendar arithmetic.
//!
//! Every "advance by N days/weeks/months/years" step of the expander goes through
//! [`CivilDateTime`], which operates on year/month/day components and keeps the
//! wall-clock time of day untouched. Timestamps enter and leave as milliseconds
//! since the Unix epoch, read in a single offset-free frame.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch, in the caller's civil frame.
pub type TimestampMs = i64;

/// A calendar date and wall-clock time with no offset attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CivilDateTime(NaiveDateTime);

impl CivilDateTime {
    /// Earliest representable instant.
    pub const MIN: Self = Self(NaiveDateTime::MIN);

    pub fn from_millis(ms: TimestampMs) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(|dt| Self(dt.naive_utc()))
    }

    pub fn to_millis(self) -> TimestampMs {
        self.0.and_utc().timestamp_millis()
    }

    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, min, sec)?;
        Some(Self(date.and_time(time)))
    }

    pub fn as_naive(self) -> NaiveDateTime {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Month of the year, 1-based.
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day of the month, 1-based.
    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn time(self) -> NaiveTime {
        self.0.time()
    }

    /// Move by `days` calendar days (negative moves backwards).
    pub fn add_days(self, days: i64) -> Option<Self> {
        let date = self.0.date();
        let shifted = if days >= 0 {
            date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
        }?;
        Some(self.with_date(shifted))
    }

    /// Move forward by `months` calendar months. A day that does not exist in the
    /// target month is clamped to that month's last day.
    pub fn add_months(self, months: u32) -> Option<Self> {
        let date = self.0.date().checked_add_months(Months::new(months))?;
        Some(self.with_date(date))
    }

    pub fn add_years(self, years: u32) -> Option<Self> {
        self.add_months(years.checked_mul(12)?)
    }

    pub fn first_of_month(self) -> Self {
        // Day 1 exists in every month.
        self.with_date(self.0.date().with_day(1).unwrap_or(self.0.date()))
    }

    pub fn first_of_next_month(self) -> Option<Self> {
        self.first_of_month().add_months(1)
    }

    pub fn first_of_year(self) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(self.year(), 1, 1)?;
        Some(self.with_date(date))
    }

    pub fn first_of_next_year(self) -> Option<Self> {
        self.first_of_year()?.add_years(1)
    }

    /// The first day of the week containing `self`, where weeks begin on `week_start`.
    pub fn start_of_week(self, week_start: Weekday) -> Option<Self> {
        self.add_days(-i64::from(days_after(week_start, self.weekday())))
    }

    /// Midnight of the same calendar day.
    pub fn start_of_day(self) -> Self {
        Self(self.0.date().and_time(NaiveTime::MIN))
    }

    fn with_date(self, date: NaiveDate) -> Self {
        Self(date.and_time(self.0.time()))
    }
}

impl From<NaiveDateTime> for CivilDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// Number of days from `week_start` forward to `weekday` (0..=6).
pub fn days_after(week_start: Weekday, weekday: Weekday) -> u32 {
    (weekday.num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7
}
