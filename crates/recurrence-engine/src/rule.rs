//! Structured recurrence rule (the RRULE value of RFC 5545 §3.3.10).

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::civil::{CivilDateTime, TimestampMs};

/// How often a rule's periods repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BYDAY entry: a weekday, optionally restricted to its N-th occurrence in the
/// enclosing period. `ordinal == 0` selects every matching weekday; a negative
/// ordinal counts from the end of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekdayNum {
    #[serde(default)]
    pub ordinal: i32,
    pub weekday: Weekday,
}

impl WeekdayNum {
    pub fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: 0,
            weekday,
        }
    }

    pub fn nth(ordinal: i32, weekday: Weekday) -> Self {
        Self { ordinal, weekday }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ordinal != 0 {
            write!(f, "{}", self.ordinal)?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

/// Two-letter RFC 5545 weekday code.
pub fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// An immutable repetition pattern.
///
/// Negative values in the `by_*` lists count from the end of the enclosing
/// period (`-1` is the last day of the month, the last day of the year, ...).
/// The expander assumes the rule already passed [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Inclusive upper bound on occurrence starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<TimestampMs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_weekday: Vec<WeekdayNum>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_month_day: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_year_day: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_week_number: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_month: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_set_position: Vec<i32>,
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
}

fn default_interval() -> u32 {
    1
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

impl RecurrenceRule {
    /// A rule with the given frequency and every other part at its default.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: default_interval(),
            until: None,
            count: None,
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_number: Vec::new(),
            by_month: Vec::new(),
            by_set_position: Vec::new(),
            week_start: default_week_start(),
        }
    }

    pub fn has_ordinal_weekday(&self) -> bool {
        self.by_weekday.iter().any(|w| w.ordinal != 0)
    }
}

/// Renders the rule as RRULE value text, e.g. `FREQ=MONTHLY;COUNT=10;BYDAY=1FR`.
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.frequency)?;
        if let Some(until) = self.until.and_then(CivilDateTime::from_millis) {
            write!(f, ";UNTIL={}", until.as_naive().format("%Y%m%dT%H%M%SZ"))?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        write_list(f, "BYDAY", &self.by_weekday)?;
        write_list(f, "BYMONTHDAY", &self.by_month_day)?;
        write_list(f, "BYYEARDAY", &self.by_year_day)?;
        write_list(f, "BYWEEKNO", &self.by_week_number)?;
        write_list(f, "BYMONTH", &self.by_month)?;
        write_list(f, "BYSETPOS", &self.by_set_position)?;
        if self.week_start != Weekday::Mon {
            write!(f, ";WKST={}", weekday_code(self.week_start))?;
        }
        Ok(())
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, key: &str, values: &[T]) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
    write!(f, ";{}={}", key, joined.join(","))
}
