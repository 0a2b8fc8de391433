//! # recurrence-engine
//!
//! Deterministic RRULE expansion over a civil calendar.
//!
//! The engine turns an event series (a start, a duration and an RFC 5545
//! recurrence rule) into its concrete, chronologically ordered occurrences,
//! then reconciles them with explicit additions (RDATE) and exclusions
//! (EXDATE). All arithmetic happens on calendar components, so "every month
//! on the 31st" skips short months instead of drifting.
//!
//! ## Modules
//!
//! - [`expander`] — event series / RRULE string → list of occurrences
//! - `period` — candidate dates within one month or year of a rule
//! - [`aggregate`] — set algebra over collections keyed by an identity function
//! - [`civil`] — calendar-component date-time arithmetic
//! - [`rule`] / [`event`] — the recurrence rule and event series model
//! - [`parser`] — RRULE and DATE-TIME text parsing
//! - [`validate`] — structural checks before expansion
//! - [`timeline`] — daily / weekly / monthly time-used statistics
//! - [`error`] — Error types

pub mod aggregate;
pub mod civil;
pub mod error;
pub mod event;
pub mod expander;
pub mod parser;
pub(crate) mod period;
pub mod rule;
pub mod timeline;
pub mod validate;

pub use aggregate::IdentitySet;
pub use civil::{CivilDateTime, TimestampMs};
pub use error::{RecurrenceError, Result};
pub use event::{EventKind, EventSeries, Occurrence};
pub use expander::{
    expand, expand_from_rule, expand_rrule, expand_rrule_with_exdates,
    expand_rrule_with_overrides, EXPANSION_HORIZON_YEARS,
};
pub use parser::{parse_date_time, parse_rrule, parse_weekday, parse_weekday_num};
pub use rule::{Frequency, RecurrenceRule, WeekdayNum};
pub use timeline::{TimeUsed, TimelineUsage};
pub use validate::{validate, validate_rule};
