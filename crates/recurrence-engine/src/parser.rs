//! Text parsing for RRULE values and iCalendar DATE / DATE-TIME strings.
//!
//! Date-times are read into the same offset-free frame the expander works in:
//! a trailing `Z` is accepted and otherwise ignored.

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::civil::{CivilDateTime, TimestampMs};
use crate::error::{RecurrenceError, Result};
use crate::rule::{Frequency, RecurrenceRule, WeekdayNum};

/// Parse an RRULE value such as `FREQ=MONTHLY;COUNT=10;BYDAY=1FR`.
///
/// The `RRULE:` prefix is optional. Recognised parts are FREQ, UNTIL, COUNT,
/// INTERVAL, BYDAY, BYMONTHDAY, BYYEARDAY, BYWEEKNO, BYMONTH, BYSETPOS and WKST;
/// any other part (BYHOUR, BYMINUTE, ...) is skipped with a warning.
///
/// # Errors
/// Returns `RecurrenceError::InvalidRule` when FREQ is missing, a part is not
/// `KEY=VALUE`, or a value cannot be read.
pub fn parse_rrule(text: &str) -> Result<RecurrenceRule> {
    let text = text.trim();
    let body = match text.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &text[6..],
        _ => text,
    };

    let mut frequency = None;
    let mut rule = RecurrenceRule::new(Frequency::Daily);

    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| invalid_rule(format!("expected KEY=VALUE, got '{part}'")))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();
        match key.as_str() {
            "FREQ" => frequency = Some(parse_frequency(value)?),
            "UNTIL" => rule.until = Some(parse_date_time(value).map_err(|e| invalid_rule(e.to_string()))?),
            "COUNT" => rule.count = Some(parse_number(&key, value)?),
            "INTERVAL" => rule.interval = parse_number(&key, value)?,
            "BYDAY" => rule.by_weekday = parse_list(value, parse_weekday_num)?,
            "BYMONTHDAY" => rule.by_month_day = parse_list(value, |v| parse_number(&key, v))?,
            "BYYEARDAY" => rule.by_year_day = parse_list(value, |v| parse_number(&key, v))?,
            "BYWEEKNO" => rule.by_week_number = parse_list(value, |v| parse_number(&key, v))?,
            "BYMONTH" => rule.by_month = parse_list(value, |v| parse_number(&key, v))?,
            "BYSETPOS" => rule.by_set_position = parse_list(value, |v| parse_number(&key, v))?,
            "WKST" => rule.week_start = parse_weekday(value)?,
            other => tracing::warn!(part = other, "ignoring unsupported RRULE part"),
        }
    }

    rule.frequency = frequency.ok_or_else(|| invalid_rule("missing FREQ"))?;
    Ok(rule)
}

fn parse_frequency(value: &str) -> Result<Frequency> {
    match value.to_ascii_uppercase().as_str() {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        other => Err(invalid_rule(format!("unsupported FREQ '{other}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    digits
        .parse()
        .map_err(|_| invalid_rule(format!("{key} value '{value}' is not a number")))
}

fn parse_list<T>(value: &str, parse: impl Fn(&str) -> Result<T>) -> Result<Vec<T>> {
    value.split(',').map(|v| parse(v.trim())).collect()
}

/// Parse a two-letter weekday code (`MO` .. `SU`).
pub fn parse_weekday(code: &str) -> Result<Weekday> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        _ => Err(invalid_rule(format!("unknown weekday '{code}'"))),
    }
}

/// Parse a BYDAY entry: an optional signed ordinal followed by a weekday code,
/// e.g. `TU`, `2MO`, `-1SU`, `+3FR`.
pub fn parse_weekday_num(text: &str) -> Result<WeekdayNum> {
    let text = text.trim();
    if text.len() < 2 || !text.is_char_boundary(text.len() - 2) {
        return Err(invalid_rule(format!("malformed BYDAY entry '{text}'")));
    }
    let (ordinal, code) = text.split_at(text.len() - 2);
    let weekday = parse_weekday(code)?;
    let ordinal = if ordinal.is_empty() {
        0
    } else {
        parse_number("BYDAY", ordinal)?
    };
    Ok(WeekdayNum::nth(ordinal, weekday))
}

/// Parse `YYYYMMDD`, `YYYYMMDDTHHMMSS` or `YYYYMMDDTHHMMSSZ` into a timestamp.
///
/// The dashed ISO form (`2026-02-17T14:00:00`) is accepted as well. A DATE
/// value is taken as midnight.
///
/// # Errors
/// Returns `RecurrenceError::InvalidDateTime` for anything else.
pub fn parse_date_time(text: &str) -> Result<TimestampMs> {
    let compact = text.trim().replace(['-', ':'], "");
    let compact = compact.strip_suffix('Z').unwrap_or(&compact);

    let naive = if compact.len() == 8 {
        NaiveDate::parse_from_str(compact, "%Y%m%d").map(|date| date.and_time(chrono::NaiveTime::MIN))
    } else {
        NaiveDateTime::parse_from_str(compact, "%Y%m%dT%H%M%S")
    }
    .map_err(|e| RecurrenceError::InvalidDateTime(format!("'{text}': {e}")))?;

    Ok(CivilDateTime::from(naive).to_millis())
}

fn invalid_rule(message: impl Into<String>) -> RecurrenceError {
    RecurrenceError::InvalidRule(message.into())
}
