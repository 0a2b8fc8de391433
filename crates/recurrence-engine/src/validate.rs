//! Structural checks on an event before it is expanded.
//!
//! The expander trusts its input: a rule that combines parts the expander
//! does not handle together would silently lose those parts. [`validate`]
//! rejects such combinations up front, together with out-of-range values.

use crate::error::{RecurrenceError, Result};
use crate::event::EventSeries;
use crate::rule::{Frequency, RecurrenceRule};

/// Check an event series; returns the first problem found.
pub fn validate(series: &EventSeries) -> Result<()> {
    if series.end.is_none() && series.duration.is_none() {
        return Err(RecurrenceError::InvalidEvent(
            "Either end or duration must be specified".to_string(),
        ));
    }
    if let Some(end) = series.end {
        if end < series.start {
            return Err(RecurrenceError::InvalidEvent("end is before start".to_string()));
        }
    }
    if series.duration.is_some_and(|d| d < 0) {
        return Err(RecurrenceError::InvalidEvent("duration is negative".to_string()));
    }
    if series.start.checked_add(series.duration()).is_none() {
        return Err(RecurrenceError::InvalidEvent("end is out of range".to_string()));
    }

    if series.is_recurring() {
        let rule = series
            .rule
            .as_ref()
            .ok_or_else(|| RecurrenceError::InvalidEvent("Missing rule".to_string()))?;
        validate_rule(rule)?;
    }
    Ok(())
}

/// Check the part combinations and value ranges of a rule.
pub fn validate_rule(rule: &RecurrenceRule) -> Result<()> {
    use Frequency::*;
    let freq = rule.frequency;

    if rule.interval < 1 {
        return invalid("INTERVAL must be positive number");
    }
    if rule.has_ordinal_weekday() {
        if !matches!(freq, Monthly | Yearly) {
            return invalid("The BYDAY ordinal can be used only with MONTHLY or YEARLY freq");
        }
        if !rule.by_week_number.is_empty() {
            return invalid("The BYDAY ordinal cannot be used with BYWEEKNO");
        }
    }
    if !rule.by_week_number.is_empty() && freq != Yearly {
        return invalid("BYWEEKNO requires YEARLY freq");
    }
    if !rule.by_year_day.is_empty() && matches!(freq, Daily | Weekly | Monthly) {
        return invalid("BYYEARDAY cannot be used with DAILY, WEEKLY, and MONTHLY freqs");
    }
    if !rule.by_month_day.is_empty() && matches!(freq, Daily | Weekly) {
        return invalid("BYMONTHDAY cannot be used with DAILY or WEEKLY freq");
    }
    if !rule.by_weekday.is_empty() && freq == Daily {
        return invalid("BYDAY cannot be used with DAILY freq");
    }
    if !rule.by_month.is_empty() && matches!(freq, Weekly | Monthly) {
        return invalid("BYMONTH requires YEARLY or DAILY freq");
    }
    if !rule.by_set_position.is_empty() && !matches!(freq, Monthly | Yearly) {
        return invalid("BYSETPOS requires MONTHLY or YEARLY freq");
    }

    check_range("BYMONTH", rule.by_month.iter().map(|&m| i64::from(m)), 1, 12, false)?;
    check_range("BYMONTHDAY", rule.by_month_day.iter().map(|&d| i64::from(d)), 1, 31, true)?;
    check_range("BYYEARDAY", rule.by_year_day.iter().map(|&d| i64::from(d)), 1, 366, true)?;
    check_range("BYWEEKNO", rule.by_week_number.iter().map(|&w| i64::from(w)), 1, 53, true)?;
    check_range("BYSETPOS", rule.by_set_position.iter().map(|&p| i64::from(p)), 1, 366, true)?;
    check_range(
        "BYDAY ordinal",
        rule.by_weekday
            .iter()
            .filter(|w| w.ordinal != 0)
            .map(|w| i64::from(w.ordinal)),
        1,
        53,
        true,
    )?;
    Ok(())
}

/// Every value must lie in `min..=max`, or in `-max..=-min` when `signed`.
fn check_range(
    part: &str,
    values: impl IntoIterator<Item = i64>,
    min: i64,
    max: i64,
    signed: bool,
) -> Result<()> {
    for value in values {
        let magnitude = if signed { value.abs() } else { value };
        if !(min..=max).contains(&magnitude) {
            let allowed = if signed {
                format!("±{min}..={max}")
            } else {
                format!("{min}..={max}")
            };
            return invalid(&format!("{part} value {value} is outside {allowed}"));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> Result<()> {
    Err(RecurrenceError::InvalidRule(message.to_string()))
}
