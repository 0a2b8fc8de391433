//! Error types for recurrence-engine operations.
//!
//! Expansion itself never fails; errors come from parsing rule text and from
//! validating an event before it is handed to the expander.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
