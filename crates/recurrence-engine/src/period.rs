//! Candidate dates for a single period of a rule.
//!
//! Each function here takes a period anchor (the first day of a month or year,
//! at the series' wall-clock time) and returns that period's candidates, sorted
//! and without duplicates. Window bounds and COUNT are applied by the caller.

use chrono::Weekday;

use crate::aggregate::IdentitySet;
use crate::civil::{days_after, CivilDateTime};
use crate::rule::{RecurrenceRule, WeekdayNum};

pub(crate) type Dates = Vec<CivilDateTime>;

fn identity(date: &CivilDateTime) -> CivilDateTime {
    *date
}

fn by_value() -> IdentitySet<fn(&CivilDateTime) -> CivilDateTime> {
    IdentitySet::new(identity as fn(&CivilDateTime) -> CivilDateTime)
}

pub(crate) fn distinct_sorted(dates: &[CivilDateTime]) -> Dates {
    let mut distinct = by_value().union(dates, &[]);
    distinct.sort();
    distinct
}

pub(crate) fn intersect(a: &[CivilDateTime], b: &[CivilDateTime]) -> Dates {
    distinct_sorted(&by_value().join(a, b))
}

/// 1-based position from the front (positive) or the back (negative).
/// Zero and out-of-range positions select nothing.
pub(crate) fn select_nth<T: Copy>(items: &[T], position: i32) -> Option<T> {
    let len = items.len() as i64;
    let position = i64::from(position);
    let index = match position {
        p if p > 0 => p - 1,
        p if p < 0 => len + p,
        _ => return None,
    };
    if (0..len).contains(&index) {
        items.get(index as usize).copied()
    } else {
        None
    }
}

/// BYSETPOS: re-select from an already sorted candidate set. An empty position
/// list or an empty set leaves the candidates as they are.
pub(crate) fn apply_set_positions(sorted: Dates, positions: &[i32]) -> Dates {
    if positions.is_empty() || sorted.is_empty() {
        return sorted;
    }
    let selected: Dates = positions
        .iter()
        .filter_map(|&position| select_nth(&sorted, position))
        .collect();
    distinct_sorted(&selected)
}

/// Every date in `[from, until)` that falls on `weekday`.
fn weekday_matches(from: CivilDateTime, until: CivilDateTime, weekday: Weekday) -> Dates {
    let first = from.add_days(i64::from(days_after(from.weekday(), weekday)));
    std::iter::successors(first, |date| date.add_days(7))
        .take_while(|date| *date < until)
        .collect()
}

/// Resolve BYDAY entries within `[from, until)`: ordinal 0 keeps every match,
/// otherwise the N-th match from the front or back.
pub(crate) fn resolve_weekdays(
    from: CivilDateTime,
    until: CivilDateTime,
    entries: &[WeekdayNum],
) -> Dates {
    let mut dates = Vec::new();
    for entry in entries {
        let matches = weekday_matches(from, until, entry.weekday);
        if entry.ordinal == 0 {
            dates.extend(matches);
        } else if let Some(date) = select_nth(&matches, entry.ordinal) {
            dates.push(date);
        }
    }
    distinct_sorted(&dates)
}

/// Resolve signed day offsets within `[from, until)`: positive N is the N-th day
/// from `from`, negative N the N-th day back from the end. Offsets that land
/// outside the range (Feb 30, day 366 of a common year) are dropped.
pub(crate) fn resolve_day_offsets(
    from: CivilDateTime,
    until: CivilDateTime,
    offsets: &[i32],
) -> Dates {
    let dates: Dates = offsets
        .iter()
        .filter_map(|&offset| match offset {
            o if o > 0 => from.add_days(i64::from(o) - 1),
            o if o < 0 => until.add_days(i64::from(o)),
            _ => None,
        })
        .filter(|date| *date >= from && *date < until)
        .collect();
    distinct_sorted(&dates)
}

/// Every day in `[from, until)`.
fn every_day(from: CivilDateTime, until: CivilDateTime) -> Dates {
    std::iter::successors(Some(from), |date| date.add_days(1))
        .take_while(|date| *date < until)
        .collect()
}

/// Selectors applied to one month.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MonthSelectors<'a> {
    pub month_days: &'a [i32],
    pub weekdays: &'a [WeekdayNum],
    pub set_positions: &'a [i32],
}

/// Candidates of the month starting at `month_start`.
///
/// Month days and weekdays are resolved separately; BYSETPOS re-selects from the
/// weekday set only. When both selectors are given the result is their
/// intersection. With neither, every day of the month is a candidate.
pub(crate) fn resolve_month(month_start: CivilDateTime, selectors: MonthSelectors<'_>) -> Dates {
    let Some(next_month) = month_start.first_of_next_month() else {
        return Vec::new();
    };

    let by_month_day = (!selectors.month_days.is_empty())
        .then(|| resolve_day_offsets(month_start, next_month, selectors.month_days));
    let by_weekday = (!selectors.weekdays.is_empty()).then(|| {
        let matches = resolve_weekdays(month_start, next_month, selectors.weekdays);
        apply_set_positions(matches, selectors.set_positions)
    });

    match (by_month_day, by_weekday) {
        (Some(days), Some(weekdays)) => intersect(&days, &weekdays),
        (Some(days), None) => days,
        (None, Some(weekdays)) => weekdays,
        (None, None) => every_day(month_start, next_month),
    }
}

/// Candidates of the year starting at `year_start`.
///
/// Up to four sources are computed independently and intersected:
///
/// 1. BYMONTH (every month when only BYMONTHDAY is given), with each month
///    resolved like a MONTHLY period. When the rule has no BYxxx part at all,
///    the series start's month and day are used instead.
/// 2. BYWEEKNO, one date per BYDAY weekday (or the series start's weekday) in
///    each listed week. Week 1 is the `week_start`-relative week holding Jan 4.
/// 3. BYYEARDAY, as signed day offsets within the year.
/// 4. BYDAY over the whole year, when neither BYMONTH nor BYWEEKNO scopes it,
///    followed by BYSETPOS.
pub(crate) fn resolve_year(
    year_start: CivilDateTime,
    rule: &RecurrenceRule,
    series_start: CivilDateTime,
) -> Dates {
    let Some(next_year) = year_start.first_of_next_year() else {
        return Vec::new();
    };

    let sources = [
        month_source(year_start, rule, series_start),
        week_number_source(year_start, next_year, rule, series_start),
        (!rule.by_year_day.is_empty())
            .then(|| resolve_day_offsets(year_start, next_year, &rule.by_year_day)),
        year_weekday_source(year_start, next_year, rule),
    ];

    sources
        .into_iter()
        .flatten()
        .reduce(|acc, source| intersect(&acc, &source))
        .unwrap_or_default()
}

fn month_source(
    year_start: CivilDateTime,
    rule: &RecurrenceRule,
    series_start: CivilDateTime,
) -> Option<Dates> {
    let day_level = !rule.by_month_day.is_empty()
        || !rule.by_weekday.is_empty()
        || !rule.by_year_day.is_empty()
        || !rule.by_week_number.is_empty();

    let months: Vec<u32> = if !rule.by_month.is_empty() {
        rule.by_month.clone()
    } else if !rule.by_month_day.is_empty() {
        (1..=12).collect()
    } else if !day_level {
        vec![series_start.month()]
    } else {
        return None;
    };
    // Without any day-level part the start's day of month is implied.
    let month_days = if day_level {
        rule.by_month_day.clone()
    } else {
        vec![series_start.day() as i32]
    };

    let selectors = MonthSelectors {
        month_days: &month_days,
        weekdays: &rule.by_weekday,
        set_positions: &rule.by_set_position,
    };
    let mut dates = Vec::new();
    for month in months.into_iter().filter(|m| (1..=12).contains(m)) {
        if let Some(month_start) = year_start.add_months(month - 1) {
            dates.extend(resolve_month(month_start, selectors));
        }
    }
    Some(distinct_sorted(&dates))
}

fn week_number_source(
    year_start: CivilDateTime,
    next_year: CivilDateTime,
    rule: &RecurrenceRule,
    series_start: CivilDateTime,
) -> Option<Dates> {
    if rule.by_week_number.is_empty() {
        return None;
    }
    let week_start = rule.week_start;
    let first_week = year_start.add_days(3)?.start_of_week(week_start)?;
    let last_week = next_year.add_days(-4)?.start_of_week(week_start)?;

    let weekdays: Vec<Weekday> = if rule.by_weekday.is_empty() {
        vec![series_start.weekday()]
    } else {
        rule.by_weekday.iter().map(|w| w.weekday).collect()
    };

    let mut dates = Vec::new();
    for &number in &rule.by_week_number {
        let week = match number {
            n if n > 0 => first_week.add_days(7 * (i64::from(n) - 1)),
            n if n < 0 => last_week.add_days(7 * (i64::from(n) + 1)),
            _ => None,
        };
        // Week 53 of a 52-week year does not exist.
        let Some(week) = week.filter(|w| *w >= first_week && *w <= last_week) else {
            continue;
        };
        dates.extend(
            weekdays
                .iter()
                .filter_map(|&weekday| week.add_days(i64::from(days_after(week_start, weekday)))),
        );
    }
    Some(distinct_sorted(&dates))
}

fn year_weekday_source(
    year_start: CivilDateTime,
    next_year: CivilDateTime,
    rule: &RecurrenceRule,
) -> Option<Dates> {
    if rule.by_weekday.is_empty() || !rule.by_month.is_empty() || !rule.by_week_number.is_empty() {
        return None;
    }
    let matches = resolve_weekdays(year_start, next_year, &rule.by_weekday);
    Some(apply_set_positions(matches, &rule.by_set_position))
}
