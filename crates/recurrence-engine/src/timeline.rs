//! Time-used statistics over a list of occurrences.
//!
//! Usage is bucketed per civil day first; an occurrence that crosses midnight
//! contributes to each day it touches. Weekly and monthly totals are sums of
//! the daily buckets. Overlapping occurrences are counted additively.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::civil::{CivilDateTime, TimestampMs};
use crate::event::Occurrence;

/// Total duration (ms) used within the bucket starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUsed {
    pub start: TimestampMs,
    pub duration: i64,
}

/// Bucketed usage of a set of occurrences.
#[derive(Debug, Clone)]
pub struct TimelineUsage {
    occurrences: Vec<Occurrence>,
    daily: BTreeMap<TimestampMs, i64>,
    weekly: BTreeMap<TimestampMs, i64>,
    monthly: BTreeMap<TimestampMs, i64>,
}

impl TimelineUsage {
    /// Weeks start on `first_day_of_week`.
    pub fn new(occurrences: &[Occurrence], first_day_of_week: Weekday) -> Self {
        let mut occurrences = occurrences.to_vec();
        occurrences.sort_by_key(|o| o.start);

        let mut daily = BTreeMap::new();
        for occurrence in &occurrences {
            for (day, used) in split_by_day(occurrence) {
                *daily.entry(day).or_insert(0) += used;
            }
        }

        let mut weekly = BTreeMap::new();
        let mut monthly = BTreeMap::new();
        for (&day, &used) in &daily {
            let Some(day_civil) = CivilDateTime::from_millis(day) else {
                continue;
            };
            if let Some(week) = day_civil.start_of_week(first_day_of_week) {
                *weekly.entry(week.to_millis()).or_insert(0) += used;
            }
            *monthly.entry(day_civil.first_of_month().to_millis()).or_insert(0) += used;
        }

        tracing::debug!(
            occurrences = occurrences.len(),
            days = daily.len(),
            weeks = weekly.len(),
            months = monthly.len(),
            "computed timeline usage"
        );

        Self {
            occurrences,
            daily,
            weekly,
            monthly,
        }
    }

    /// Span from the first start to the latest end; zero when empty.
    pub fn length(&self) -> i64 {
        let Some(first) = self.occurrences.first() else {
            return 0;
        };
        let last_end = self.occurrences.iter().map(|o| o.end).max().unwrap_or(first.end);
        last_end - first.start
    }

    pub fn daily(&self) -> Vec<TimeUsed> {
        to_time_used(&self.daily)
    }

    pub fn weekly(&self) -> Vec<TimeUsed> {
        to_time_used(&self.weekly)
    }

    pub fn monthly(&self) -> Vec<TimeUsed> {
        to_time_used(&self.monthly)
    }
}

/// `(midnight, ms used that day)` for each civil day the occurrence touches.
fn split_by_day(occurrence: &Occurrence) -> Vec<(TimestampMs, i64)> {
    let Some(start) = CivilDateTime::from_millis(occurrence.start) else {
        return Vec::new();
    };
    let mut parts = Vec::new();
    let mut from = occurrence.start;
    let mut day = start.start_of_day();
    while from < occurrence.end {
        let Some(next_day) = day.add_days(1) else {
            break;
        };
        let until = next_day.to_millis().min(occurrence.end);
        parts.push((day.to_millis(), until - from));
        from = until;
        day = next_day;
    }
    parts
}

fn to_time_used(buckets: &BTreeMap<TimestampMs, i64>) -> Vec<TimeUsed> {
    buckets
        .iter()
        .map(|(&start, &duration)| TimeUsed { start, duration })
        .collect()
}
