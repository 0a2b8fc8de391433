//! RRULE expansion -- turns an event series into its concrete, ordered occurrences.
//!
//! Periods (days, weeks, months, years) are visited lazily in time order. Each
//! period yields its sorted candidates, which are clipped to the series window
//! and cut off once COUNT occurrences exist. Explicit additions and exclusions
//! are then merged in by start time.

use crate::aggregate::IdentitySet;
use crate::civil::{days_after, CivilDateTime, TimestampMs};
use crate::error::{RecurrenceError, Result};
use crate::event::{EventSeries, Occurrence};
use crate::parser::{parse_date_time, parse_rrule};
use crate::period::{self, Dates, MonthSelectors};
use crate::rule::{Frequency, RecurrenceRule, WeekdayNum};
use crate::validate::validate;

/// How far past the series start an unbounded rule is expanded, in civil years.
pub const EXPANSION_HORIZON_YEARS: u32 = 100;

const MINUTE_MS: i64 = 60 * 1000;

fn by_start(occurrence: &Occurrence) -> TimestampMs {
    occurrence.start
}

/// Expand a series into its occurrences, sorted by start time.
///
/// A series that is not a recurring master (or has no rule) yields a single
/// occurrence spanning its own start and end. A recurring master yields the
/// rule-generated occurrences united with `additional` (an addition replaces a
/// generated occurrence with the same start) minus `excluded`.
pub fn expand(series: &EventSeries) -> Vec<Occurrence> {
    if !series.is_recurring() || series.rule.is_none() {
        return vec![Occurrence {
            uid: series.uid.clone(),
            start: series.start,
            end: series.end_time(),
        }];
    }

    let generated = expand_from_rule(series);
    let occurrences = IdentitySet::new(by_start as fn(&Occurrence) -> TimestampMs);
    let merged = occurrences.union(&generated, &series.additional);
    let mut result = occurrences.exclude(&merged, &series.excluded);
    result.sort_by_key(|o| o.start);

    tracing::debug!(
        uid = %series.uid,
        generated = generated.len(),
        additional = series.additional.len(),
        excluded = series.excluded.len(),
        total = result.len(),
        "expanded series"
    );
    result
}

/// Occurrences produced by the series' rule alone, sorted by start time.
///
/// The window runs from the series start to UNTIL (inclusive) or, without
/// UNTIL, to [`EXPANSION_HORIZON_YEARS`] civil years later. Returns an empty
/// list when the series has no rule.
pub fn expand_from_rule(series: &EventSeries) -> Vec<Occurrence> {
    let Some(rule) = series.rule.as_ref() else {
        return Vec::new();
    };
    let Some(window) = Window::for_series(series.start, rule) else {
        tracing::warn!(uid = %series.uid, start = series.start, "series start is outside the civil calendar range or too close to its end");
        return Vec::new();
    };

    tracing::debug!(
        uid = %series.uid,
        frequency = %rule.frequency,
        interval = rule.interval,
        count = ?rule.count,
        window_end = %window.end,
        "expanding rule"
    );

    let mut dates = match rule.frequency {
        Frequency::Daily => daily(rule, &window),
        Frequency::Weekly => weekly(rule, &window),
        Frequency::Monthly => monthly(rule, &window),
        Frequency::Yearly => yearly(rule, &window),
    };
    dates.sort();
    if let Some(count) = window.count {
        dates.truncate(count);
    }

    let duration = series.duration();
    dates
        .into_iter()
        .map(|date| {
            let start = date.to_millis();
            Occurrence {
                uid: series.uid.clone(),
                start,
                end: start.saturating_add(duration),
            }
        })
        .collect()
}

/// Inclusive time window plus the COUNT cap of one expansion.
struct Window {
    start: CivilDateTime,
    end: CivilDateTime,
    count: Option<usize>,
}

impl Window {
    fn for_series(start: TimestampMs, rule: &RecurrenceRule) -> Option<Self> {
        let start = CivilDateTime::from_millis(start)?;
        let end = match rule.until {
            Some(until) => match CivilDateTime::from_millis(until) {
                Some(until) => until,
                // Past the end of the calendar: as far as an unbounded rule goes.
                None if until > 0 => {
                    tracing::warn!(until, "UNTIL is beyond the civil calendar range, using the horizon");
                    start.add_years(EXPANSION_HORIZON_YEARS)?
                }
                None => CivilDateTime::MIN,
            },
            None => start.add_years(EXPANSION_HORIZON_YEARS)?,
        };
        Some(Self {
            start,
            end,
            count: rule.count.map(|c| c as usize),
        })
    }

    fn contains(&self, date: CivilDateTime) -> bool {
        date >= self.start && date <= self.end
    }

    /// A period anchored at `anchor` may still contribute candidates. Anchors
    /// before the series start are visited because the period can extend past it.
    fn reaches(&self, anchor: CivilDateTime) -> bool {
        anchor <= self.end || anchor < self.start
    }

    /// Flatten the per-period candidates, keep those inside the window and stop
    /// pulling periods once COUNT occurrences have been collected.
    fn collect<I>(&self, periods: I) -> Dates
    where
        I: Iterator<Item = Dates>,
    {
        let inside = periods.flatten().filter(|date| self.contains(*date));
        match self.count {
            Some(count) => inside.take(count).collect(),
            None => inside.collect(),
        }
    }

    /// Period anchors from `first`, each `step` after the previous, while in reach.
    fn periods<'a>(
        &'a self,
        first: Option<CivilDateTime>,
        step: impl Fn(CivilDateTime) -> Option<CivilDateTime> + 'a,
    ) -> impl Iterator<Item = CivilDateTime> + 'a {
        std::iter::successors(first, move |anchor| step(*anchor))
            .take_while(move |anchor| self.reaches(*anchor))
    }
}

fn daily(rule: &RecurrenceRule, window: &Window) -> Dates {
    let step = i64::from(rule.interval.max(1));
    let days = window
        .periods(Some(window.start), move |day| day.add_days(step))
        .map(|day| {
            if rule.by_month.is_empty() || rule.by_month.contains(&day.month()) {
                vec![day]
            } else {
                Vec::new()
            }
        });
    window.collect(days)
}

fn weekly(rule: &RecurrenceRule, window: &Window) -> Dates {
    let week_start = rule.week_start;
    let weekdays: Vec<WeekdayNum> = if rule.by_weekday.is_empty() {
        vec![WeekdayNum::every(window.start.weekday())]
    } else {
        rule.by_weekday.clone()
    };
    let mut offsets: Vec<i64> = weekdays
        .iter()
        .map(|w| i64::from(days_after(week_start, w.weekday)))
        .collect();
    offsets.sort_unstable();
    offsets.dedup();

    let step = 7 * i64::from(rule.interval.max(1));
    let weeks = window
        .periods(window.start.start_of_week(week_start), move |week| week.add_days(step))
        .map(|week| {
            tracing::trace!(week = %week, "weekly period");
            offsets
                .iter()
                .filter_map(|&offset| week.add_days(offset))
                .collect::<Dates>()
        });
    window.collect(weeks)
}

fn monthly(rule: &RecurrenceRule, window: &Window) -> Dates {
    let default_day = [window.start.day() as i32];
    let month_days: &[i32] = if rule.by_month_day.is_empty() && rule.by_weekday.is_empty() {
        &default_day
    } else {
        &rule.by_month_day
    };
    let selectors = MonthSelectors {
        month_days,
        weekdays: &rule.by_weekday,
        set_positions: &rule.by_set_position,
    };

    let step = rule.interval.max(1);
    let months = window
        .periods(Some(window.start.first_of_month()), move |month| month.add_months(step))
        .map(|month| {
            tracing::trace!(month = %month, "monthly period");
            period::resolve_month(month, selectors)
        });
    window.collect(months)
}

fn yearly(rule: &RecurrenceRule, window: &Window) -> Dates {
    let step = rule.interval.max(1);
    let years = window
        .periods(window.start.first_of_year(), move |year| year.add_years(step))
        .map(|year| {
            tracing::trace!(year = %year, "yearly period");
            period::resolve_year(year, rule, window.start)
        });
    window.collect(years)
}

/// Expand an RRULE string into concrete occurrences.
///
/// # Arguments
/// - `rrule` -- RFC 5545 RRULE value (e.g., "FREQ=WEEKLY;BYDAY=TU,TH"), with or
///   without the `RRULE:` prefix
/// - `dtstart` -- Start date-time (`19970902T090000` or `1997-09-02T09:00:00`)
/// - `duration_minutes` -- Duration of each occurrence in minutes
/// - `until` -- Optional end boundary, used only when the rule has no UNTIL
/// - `count` -- Optional maximum number of occurrences (rule COUNT takes precedence
///   during expansion; the result is always truncated to this many)
///
/// # Errors
/// Returns `RecurrenceError::InvalidRule` if the RRULE is empty, unparseable or
/// fails validation, and `RecurrenceError::InvalidDateTime` for a bad date-time.
pub fn expand_rrule(
    rrule: &str,
    dtstart: &str,
    duration_minutes: u32,
    until: Option<&str>,
    count: Option<u32>,
) -> Result<Vec<Occurrence>> {
    expand_rrule_with_overrides(rrule, dtstart, duration_minutes, until, count, &[], &[])
}

/// Expand an RRULE string, removing the occurrences that start at `exdates`.
///
/// Identical to [`expand_rrule`] otherwise; `exdates` use the same format as `dtstart`.
pub fn expand_rrule_with_exdates(
    rrule: &str,
    dtstart: &str,
    duration_minutes: u32,
    until: Option<&str>,
    count: Option<u32>,
    exdates: &[&str],
) -> Result<Vec<Occurrence>> {
    expand_rrule_with_overrides(rrule, dtstart, duration_minutes, until, count, &[], exdates)
}

/// Expand an RRULE string with explicit extra occurrences (`rdates`) and
/// exclusions (`exdates`).
pub fn expand_rrule_with_overrides(
    rrule: &str,
    dtstart: &str,
    duration_minutes: u32,
    until: Option<&str>,
    count: Option<u32>,
    rdates: &[&str],
    exdates: &[&str],
) -> Result<Vec<Occurrence>> {
    if rrule.trim().is_empty() {
        return Err(RecurrenceError::InvalidRule("empty RRULE string".to_string()));
    }

    // Short-circuit: caller explicitly wants zero occurrences.
    if count == Some(0) {
        return Ok(Vec::new());
    }

    let mut rule = parse_rrule(rrule)?;
    if rule.count.is_none() {
        rule.count = count;
    }
    if let (None, Some(until)) = (rule.until, until) {
        rule.until = Some(parse_date_time(until)?);
    }

    let start = parse_date_time(dtstart)?;
    let duration = i64::from(duration_minutes) * MINUTE_MS;
    let mut series = EventSeries::recurring(String::new(), start, duration, rule);
    for rdate in rdates {
        series = series.with_additional(parse_date_time(rdate)?);
    }
    for exdate in exdates {
        series = series.with_excluded(parse_date_time(exdate)?);
    }
    validate(&series)?;

    let mut occurrences = expand(&series);
    if let Some(c) = count {
        occurrences.truncate(c as usize);
    }
    Ok(occurrences)
}
