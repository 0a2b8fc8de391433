//! Tests for RRULE and DATE-TIME parsing.

use chrono::Weekday;
use recurrence_engine::{
    parse_date_time, parse_rrule, parse_weekday, CivilDateTime, Frequency, RecurrenceError,
    RecurrenceRule, WeekdayNum,
};

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
    CivilDateTime::from_ymd_hms(y, m, d, h, min, s).unwrap().to_millis()
}

#[test]
fn weekday_codes() {
    let cases = [
        ("MO", Weekday::Mon),
        ("TU", Weekday::Tue),
        ("WE", Weekday::Wed),
        ("TH", Weekday::Thu),
        ("FR", Weekday::Fri),
        ("SA", Weekday::Sat),
        ("SU", Weekday::Sun),
    ];
    for (code, weekday) in cases {
        assert_eq!(parse_weekday(code).unwrap(), weekday, "{code}");
    }
    assert!(parse_weekday("XX").is_err());
}

#[test]
fn date_time_forms() {
    assert_eq!(parse_date_time("19730429T070000Z").unwrap(), ts(1973, 4, 29, 7, 0, 0));
    assert_eq!(parse_date_time("19730429T070000").unwrap(), ts(1973, 4, 29, 7, 0, 0));
    assert_eq!(parse_date_time("19730429").unwrap(), ts(1973, 4, 29, 0, 0, 0));
    assert_eq!(parse_date_time("2026-02-17T14:00:00").unwrap(), ts(2026, 2, 17, 14, 0, 0));
}

#[test]
fn bad_date_times_are_rejected() {
    for text in ["", "1997", "19970230T090000", "19970902T250000", "tomorrow"] {
        assert!(
            matches!(parse_date_time(text), Err(RecurrenceError::InvalidDateTime(_))),
            "{text:?}"
        );
    }
}

#[test]
fn yearly_with_month_and_last_sunday() {
    let rule = parse_rrule("RRULE:FREQ=YEARLY;BYMONTH=4;BYDAY=-1SU;UNTIL=19730429T070000Z").unwrap();

    assert_eq!(
        rule,
        RecurrenceRule {
            by_month: vec![4],
            by_weekday: vec![WeekdayNum::nth(-1, Weekday::Sun)],
            until: Some(ts(1973, 4, 29, 7, 0, 0)),
            ..RecurrenceRule::new(Frequency::Yearly)
        }
    );
}

#[test]
fn daily_count_and_interval() {
    let rule = parse_rrule("RRULE:FREQ=DAILY;INTERVAL=10;COUNT=5").unwrap();

    assert_eq!(rule.frequency, Frequency::Daily);
    assert_eq!(rule.interval, 10);
    assert_eq!(rule.count, Some(5));
    assert_eq!(rule.until, None);
}

#[test]
fn weekly_with_week_start_and_days() {
    let rule = parse_rrule("RRULE:FREQ=WEEKLY;INTERVAL=2;UNTIL=19971224T000000Z;WKST=SU;BYDAY=MO,WE,FR").unwrap();

    assert_eq!(
        rule,
        RecurrenceRule {
            interval: 2,
            until: Some(ts(1997, 12, 24, 0, 0, 0)),
            week_start: Weekday::Sun,
            by_weekday: vec![
                WeekdayNum::every(Weekday::Mon),
                WeekdayNum::every(Weekday::Wed),
                WeekdayNum::every(Weekday::Fri),
            ],
            ..RecurrenceRule::new(Frequency::Weekly)
        }
    );
}

#[test]
fn week_start_defaults_to_monday() {
    let rule = parse_rrule("FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU").unwrap();
    assert_eq!(rule.week_start, Weekday::Mon);
}

#[test]
fn yearly_with_every_numeric_list() {
    let rule = parse_rrule(
        "FREQ=YEARLY;INTERVAL=4;BYMONTH=11;BYDAY=TU;BYMONTHDAY=2,3,4,5,6,7,8;BYYEARDAY=-1;BYWEEKNO=+20;BYSETPOS=1,-1",
    )
    .unwrap();

    assert_eq!(rule.interval, 4);
    assert_eq!(rule.by_month, vec![11]);
    assert_eq!(rule.by_weekday, vec![WeekdayNum::every(Weekday::Tue)]);
    assert_eq!(rule.by_month_day, vec![2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(rule.by_year_day, vec![-1]);
    assert_eq!(rule.by_week_number, vec![20]);
    assert_eq!(rule.by_set_position, vec![1, -1]);
}

#[test]
fn unsupported_parts_are_ignored() {
    let rule = parse_rrule("FREQ=DAILY;BYHOUR=9,17;BYMINUTE=30;COUNT=2").unwrap();

    assert_eq!(
        rule,
        RecurrenceRule {
            count: Some(2),
            ..RecurrenceRule::new(Frequency::Daily)
        }
    );
}

#[test]
fn malformed_rules_are_rejected() {
    for text in [
        "COUNT=10",
        "FREQ=HOURLY",
        "FREQ=DAILY;COUNT=ten",
        "FREQ=WEEKLY;BYDAY=XX",
        "FREQ=WEEKLY;WKST=MONDAY",
        "FREQ=DAILY;COUNT",
        "FREQ=MONTHLY;BYMONTHDAY=1,,2",
        "FREQ=DAILY;UNTIL=soon",
    ] {
        assert!(
            matches!(parse_rrule(text), Err(RecurrenceError::InvalidRule(_))),
            "{text}"
        );
    }
}

#[test]
fn display_renders_parsable_text() {
    let text = "FREQ=MONTHLY;UNTIL=19971224T000000Z;INTERVAL=2;BYDAY=1SU,-1SU;WKST=SU";
    let rule = parse_rrule(text).unwrap();

    assert_eq!(rule.to_string(), text);
    assert_eq!(parse_rrule(&rule.to_string()).unwrap(), rule);
}
