//! Event series and the occurrences expanded from them.

use serde::{Deserialize, Serialize};

use crate::civil::{CivilDateTime, TimestampMs};
use crate::rule::RecurrenceRule;

/// Role of an event in an iCalendar object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Single,
    RecurringMaster,
    Occurrence,
    Exception,
}

/// One concrete instance of an event.
///
/// Set operations identify occurrences by `start` alone; two occurrences with the
/// same start are the same instance even if their ends differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// UID of the owning event.
    pub uid: String,
    pub start: TimestampMs,
    pub end: TimestampMs,
}

impl Occurrence {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    pub fn start_civil(&self) -> Option<CivilDateTime> {
        CivilDateTime::from_millis(self.start)
    }
}

/// A recurring master (or a plain single event) together with its explicit
/// RDATE-style additions and EXDATE-style exclusions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSeries {
    pub uid: String,
    #[serde(default)]
    pub kind: EventKind,
    pub start: TimestampMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<TimestampMs>,
    /// Duration in milliseconds; takes precedence over `end`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<Occurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<Occurrence>,
}

impl EventSeries {
    pub fn single(uid: impl Into<String>, start: TimestampMs, end: TimestampMs) -> Self {
        Self {
            uid: uid.into(),
            kind: EventKind::Single,
            start,
            end: Some(end),
            duration: None,
            rule: None,
            additional: Vec::new(),
            excluded: Vec::new(),
        }
    }

    pub fn recurring(
        uid: impl Into<String>,
        start: TimestampMs,
        duration: i64,
        rule: RecurrenceRule,
    ) -> Self {
        Self {
            uid: uid.into(),
            kind: EventKind::RecurringMaster,
            start,
            end: None,
            duration: Some(duration),
            rule: Some(rule),
            additional: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Add an explicit extra instance starting at `start`, lasting the series duration.
    pub fn with_additional(mut self, start: TimestampMs) -> Self {
        let occurrence = self.occurrence_at(start);
        self.additional.push(occurrence);
        self
    }

    /// Suppress the instance starting at `start`.
    pub fn with_excluded(mut self, start: TimestampMs) -> Self {
        let occurrence = self.occurrence_at(start);
        self.excluded.push(occurrence);
        self
    }

    /// Explicit duration if present, otherwise `end - start`, otherwise zero.
    pub fn duration(&self) -> i64 {
        self.duration
            .or_else(|| self.end.map(|end| end.saturating_sub(self.start)))
            .unwrap_or(0)
    }

    pub fn end_time(&self) -> TimestampMs {
        self.end.unwrap_or_else(|| self.start.saturating_add(self.duration()))
    }

    pub fn is_recurring(&self) -> bool {
        self.kind == EventKind::RecurringMaster
    }

    /// An occurrence of this series starting at `start`.
    pub fn occurrence_at(&self, start: TimestampMs) -> Occurrence {
        Occurrence {
            uid: self.uid.clone(),
            start,
            end: start.saturating_add(self.duration()),
        }
    }
}
