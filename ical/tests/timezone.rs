// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for deriving timezone engines from `VTIMEZONE` text.

use jiff::Timestamp;
use jiff::civil::{DateTime, datetime};
use jiff::tz::Offset;

use tzcal_ical::{
    ComponentKind, Context, DateTimeError, EngineKind, PropertyValue, Rejection, TimezoneEngine,
    derive, parse_components, parse_str,
};

const EU_WEST: &str = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Europe/Lisbon-Custom\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19961027T030000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU\r\n\
TZOFFSETFROM:+0100\r\n\
TZOFFSETTO:+0000\r\n\
TZNAME:WET\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:19810329T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU\r\n\
TZOFFSETFROM:+0000\r\n\
TZOFFSETTO:+0100\r\n\
TZNAME:WEST\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n\
";

const NEW_YORK: &str = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:US-Eastern\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:19870405T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0400\r\n\
TZNAME:EDT\r\n\
END:DAYLIGHT\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19671029T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
TZNAME:EST\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n\
";

const SYDNEY: &str = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Australia-Sydney\r\n\
BEGIN:STANDARD\r\n\
DTSTART:20080406T030000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=4;BYDAY=1SU\r\n\
TZOFFSETFROM:+1100\r\n\
TZOFFSETTO:+1000\r\n\
TZNAME:AEST\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:20081005T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=1SU\r\n\
TZOFFSETFROM:+1000\r\n\
TZOFFSETTO:+1100\r\n\
TZNAME:AEDT\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n\
";

fn engine(src: &str) -> TimezoneEngine {
    let calendars = parse_components(src).unwrap();
    let timezone = calendars[0]
        .children_of_kind(ComponentKind::Timezone)
        .next()
        .unwrap();
    derive(timezone).unwrap()
}

fn utc(s: &str) -> Timestamp {
    s.parse().unwrap()
}

fn check(engine: &TimezoneEngine, cases: &[(DateTime, Option<&str>)]) {
    for &(local, expected) in cases {
        let actual = engine.to_utc(local).ok();
        assert_eq!(actual, expected.map(utc), "{local} in {}", engine.id());
    }
}

#[test]
fn eu_west_transitions() {
    let engine = engine(EU_WEST);
    #[rustfmt::skip]
    check(&engine, &[
        (datetime(2023, 3, 26, 1, 59, 59, 0),   Some("2023-03-26T01:59:59Z")),
        (datetime(2023, 3, 26, 2, 0, 0, 0),     None),
        (datetime(2023, 3, 26, 2, 59, 59, 0),   None),
        (datetime(2023, 3, 26, 3, 0, 0, 0),     Some("2023-03-26T02:00:00Z")),
        (datetime(2023, 10, 29, 1, 59, 59, 0),  Some("2023-10-29T00:59:59Z")),
        (datetime(2023, 10, 29, 2, 0, 0, 0),    Some("2023-10-29T02:00:00Z")),
        (datetime(2023, 7, 1, 12, 0, 0, 0),     Some("2023-07-01T11:00:00Z")),
    ]);

    assert!(engine.is_daylight(utc("2023-07-01T11:00:00Z")));
    assert!(!engine.is_daylight(utc("2023-12-01T11:00:00Z")));
}

#[test]
fn new_york_transitions() {
    let engine = engine(NEW_YORK);
    #[rustfmt::skip]
    check(&engine, &[
        (datetime(2023, 3, 12, 1, 59, 59, 0),   Some("2023-03-12T06:59:59Z")),
        (datetime(2023, 3, 12, 2, 0, 0, 0),     None),
        (datetime(2023, 3, 12, 3, 0, 0, 0),     Some("2023-03-12T07:00:00Z")),
        (datetime(2023, 11, 5, 0, 59, 59, 0),   Some("2023-11-05T04:59:59Z")),
        (datetime(2023, 11, 5, 1, 0, 0, 0),     Some("2023-11-05T06:00:00Z")),
        (datetime(2023, 11, 5, 2, 0, 0, 0),     Some("2023-11-05T07:00:00Z")),
    ]);

    assert_eq!(
        engine.offset_at(utc("2023-07-04T16:00:00Z")),
        Offset::constant(-4)
    );
    assert_eq!(
        engine.to_local(utc("2023-01-15T17:00:00Z")),
        datetime(2023, 1, 15, 12, 0, 0, 0)
    );
}

#[test]
fn southern_hemisphere_transitions() {
    let engine = engine(SYDNEY);
    let EngineKind::Annual(rule) = engine.kind() else {
        panic!("expected an annual engine");
    };
    // April carries the delta, so the summer offset is the base
    assert_eq!(rule.standard, Offset::constant(11));
    assert_eq!(rule.daylight, Offset::constant(10));
    assert_eq!(rule.start.month, 4);

    #[rustfmt::skip]
    check(&engine, &[
        (datetime(2023, 1, 29, 14, 15, 0, 0),   Some("2023-01-29T03:15:00Z")),
        (datetime(2023, 4, 2, 3, 0, 0, 0),      Some("2023-04-01T17:00:00Z")),
        (datetime(2023, 7, 29, 14, 15, 0, 0),   Some("2023-07-29T04:15:00Z")),
        (datetime(2023, 10, 1, 2, 0, 0, 0),     None),
    ]);
}

#[test]
fn fixed_offset_zone() {
    let src = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:MSK\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19700101T000000\r\n\
TZOFFSETFROM:+0300\r\n\
TZOFFSETTO:+0300\r\n\
TZNAME:MSK\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n\
";
    let engine = engine(src);
    assert_eq!(engine.kind(), &EngineKind::Fixed(Offset::constant(3)));
    check(&engine, &[(
        datetime(2023, 10, 29, 3, 0, 0, 0),
        Some("2023-10-29T00:00:00Z"),
    )]);
    assert!(!engine.is_daylight(utc("2023-07-01T00:00:00Z")));
}

#[test]
fn rejects_single_period_with_changing_offset() {
    let src = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Broken\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19700101T000000\r\n\
TZOFFSETFROM:+0200\r\n\
TZOFFSETTO:+0300\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n\
";
    let mut ctx = Context::new();
    let calendars: Vec<_> = parse_str(&mut ctx, src)
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(ctx.timezone("Broken").is_none());

    let err = derive(&calendars[0].children[0]).unwrap_err();
    assert_eq!(
        err,
        Rejection::OffsetMismatch {
            from: Offset::constant(2),
            to: Offset::constant(3),
        }
    );
}

#[test]
fn skipped_local_time_fails_to_resolve() {
    let src = NEW_YORK.replace(
        "END:VTIMEZONE\r\n",
        "END:VTIMEZONE\r\nBEGIN:VEVENT\r\nDTSTART;TZID=US-Eastern:20230312T023000\r\nEND:VEVENT\r\n",
    );
    let calendars = parse_components(&src).unwrap();
    let start = calendars[0]
        .children_of_kind(ComponentKind::Event)
        .flat_map(|event| event.values("DTSTART"))
        .find_map(PropertyValue::as_date_time)
        .unwrap();

    let err = start.resolve_utc().unwrap_err();
    assert!(matches!(err, DateTimeError::InvalidLocalTime(_)));
    assert_eq!(
        err.to_string(),
        "local time 2023-03-12T02:30:00 does not exist in time zone US-Eastern"
    );
}

#[test]
fn rejected_zone_falls_back_to_zone_database() {
    // Extra recurrence dates are outside the supported shapes
    let src = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
DTSTART;TZID=America/New_York:20230704T120000\r\n\
END:VEVENT\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19700101T000000\r\n\
RDATE:19710101T000000\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0500\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n\
";
    let mut ctx = Context::new();
    let calendars: Vec<_> = parse_str(&mut ctx, src)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(ctx.timezone_ids().count(), 0);

    let start = calendars[0]
        .children_of_kind(ComponentKind::Event)
        .flat_map(|event| event.values("DTSTART"))
        .find_map(PropertyValue::as_date_time)
        .unwrap();
    assert!(start.engine().is_none());
    assert_eq!(start.resolve_utc().unwrap(), utc("2023-07-04T16:00:00Z"));
}

#[test]
fn later_definition_replaces_cached_engine() {
    let src = format!(
        "{}{}",
        EU_WEST,
        EU_WEST.replace("+0100", "+0200").replace("+0000", "+0100")
    );
    let mut ctx = Context::new();
    let calendars: Vec<_> = parse_str(&mut ctx, &src)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(calendars.len(), 2);

    let cached = ctx.timezone("Europe/Lisbon-Custom").unwrap();
    assert_eq!(
        cached.offset_at(utc("2023-01-01T00:00:00Z")),
        Offset::constant(1)
    );
}
