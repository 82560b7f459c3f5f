// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule values as defined in RFC 5545 Section 3.3.10.
//!
//! Rules are parsed and validated structurally; occurrence expansion is left
//! to consumers.

use std::fmt::{self, Display};

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use jiff::civil::Weekday;

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::ValueExpected;
use crate::value::datetime::{ValueDateTime, value_date_or_date_time};
use crate::value::digit::{is_positive, unsigned};

/// Recurrence rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Frequency of recurrence
    pub freq: RecurrenceFrequency,
    /// Until date for recurrence
    pub until: Option<ValueDateTime>,
    /// Number of occurrences
    pub count: Option<u32>,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Second specifier
    pub by_second: Vec<u8>,
    /// Minute specifier
    pub by_minute: Vec<u8>,
    /// Hour specifier
    pub by_hour: Vec<u8>,
    /// Day of month specifier
    pub by_month_day: Vec<i8>,
    /// Day of year specifier
    pub by_year_day: Vec<i16>,
    /// Week number specifier
    pub by_week_no: Vec<i8>,
    /// Month specifier
    pub by_month: Vec<i8>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Position in set
    pub by_set_pos: Vec<i16>,
    /// Start day of week
    pub wkst: Option<Weekday>,
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceFrequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            RecurrenceFrequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            RecurrenceFrequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            RecurrenceFrequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            RecurrenceFrequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            RecurrenceFrequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            RecurrenceFrequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

/// Day of week with optional occurrence, e.g. `-1SU`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: Weekday,
    /// Occurrence within the month or year; negative counts from the end
    pub occurrence: Option<i8>,
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// recur           = recur-rule-part *( ";" recur-rule-part )
///                 ;
///                 ; The rule parts are not ordered in any
///                 ; particular sequence.
///                 ;
///                 ; The FREQ rule part is REQUIRED,
///                 ; but MUST NOT occur more than once.
///                 ;
///                 ; The UNTIL or COUNT rule parts are OPTIONAL,
///                 ; but they MUST NOT occur in the same 'recur'.
///                 ;
///                 ; The other rule parts are OPTIONAL,
///                 ; but MUST NOT occur more than once.
/// ```
pub(super) fn value_rrule<'src, I, E>() -> impl Parser<'src, I, RecurrenceRule, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    recur_rule_part()
        .separated_by(just(';'))
        .at_least(1)
        .collect()
        .try_map(build_from_parts::<I, E::Error>)
}

fn build_from_parts<'src, I, Err>(parts: Vec<Part>, span: I::Span) -> Result<RecurrenceRule, Err>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    Err: LabelError<'src, I, ValueExpected>,
{
    fn set<T>(slot: &mut Option<T>, value: T) -> Result<(), ValueExpected> {
        match slot {
            Some(_) => Err(ValueExpected::RRuleDuplicatePart),
            None => {
                *slot = Some(value);
                Ok(())
            }
        }
    }

    let mut freq = None;
    let mut until = None;
    let mut count = None;
    let mut interval = None;
    let mut by_second = None;
    let mut by_minute = None;
    let mut by_hour = None;
    let mut by_month_day = None;
    let mut by_year_day = None;
    let mut by_week_no = None;
    let mut by_month = None;
    let mut by_day = None;
    let mut by_set_pos = None;
    let mut wkst = None;

    for part in parts {
        let result = match part {
            Part::Freq(v) => set(&mut freq, v),
            Part::Until(v) => set(&mut until, v),
            Part::Count(v) => set(&mut count, v),
            Part::Interval(v) => set(&mut interval, v),
            Part::BySecond(v) => set(&mut by_second, v),
            Part::ByMinute(v) => set(&mut by_minute, v),
            Part::ByHour(v) => set(&mut by_hour, v),
            Part::ByMonthDay(v) => set(&mut by_month_day, v),
            Part::ByYearDay(v) => set(&mut by_year_day, v),
            Part::ByWeekNo(v) => set(&mut by_week_no, v),
            Part::ByMonth(v) => set(&mut by_month, v),
            Part::ByDay(v) => set(&mut by_day, v),
            Part::BySetPos(v) => set(&mut by_set_pos, v),
            Part::Wkst(v) => set(&mut wkst, v),
        };
        result.map_err(|expected| Err::expected_found([expected], None, span))?;
    }

    let freq =
        freq.ok_or_else(|| Err::expected_found([ValueExpected::RRuleRequiredFreq], None, span))?;

    if until.is_some() && count.is_some() {
        return Err(Err::expected_found(
            [ValueExpected::RRuleCountUntilExclusion],
            None,
            span,
        ));
    }

    Ok(RecurrenceRule {
        freq,
        until,
        count,
        interval,
        by_second: by_second.unwrap_or_default(),
        by_minute: by_minute.unwrap_or_default(),
        by_hour: by_hour.unwrap_or_default(),
        by_month_day: by_month_day.unwrap_or_default(),
        by_year_day: by_year_day.unwrap_or_default(),
        by_week_no: by_week_no.unwrap_or_default(),
        by_month: by_month.unwrap_or_default(),
        by_day: by_day.unwrap_or_default(),
        by_set_pos: by_set_pos.unwrap_or_default(),
        wkst,
    })
}

#[derive(Debug, Clone)]
enum Part {
    Freq(RecurrenceFrequency),
    Until(ValueDateTime),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<i8>),
    ByDay(Vec<WeekDayNum>),
    BySetPos(Vec<i16>),
    Wkst(Weekday),
}

/// ```txt
/// recur-rule-part = ( "FREQ" "=" freq )
///                 / ( "UNTIL" "=" enddate )
///                 / ( "COUNT" "=" 1*DIGIT )
///                 / ( "INTERVAL" "=" 1*DIGIT )
///                 / ( "BYSECOND" "=" byseclist )
///                 / ( "BYMINUTE" "=" byminlist )
///                 / ( "BYHOUR" "=" byhrlist )
///                 / ( "BYDAY" "=" bywdaylist )
///                 / ( "BYMONTHDAY" "=" bymodaylist )
///                 / ( "BYYEARDAY" "=" byyrdaylist )
///                 / ( "BYWEEKNO" "=" bywknolist )
///                 / ( "BYMONTH" "=" bymolist )
///                 / ( "BYSETPOS" "=" bysplist )
///                 / ( "WKST" "=" weekday )
/// ```
fn recur_rule_part<'src, I, E>() -> impl Parser<'src, I, Part, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let kw = |kw| just(kw).ignore_then(just('='));

    let freq = kw(KW_RRULE_FREQ).ignore_then(freq()).map(Part::Freq);

    // UNTIL can be a date or date-time
    let until = kw(KW_RRULE_UNTIL)
        .ignore_then(value_date_or_date_time())
        .map(Part::Until);

    let count = kw(KW_RRULE_COUNT)
        .ignore_then(unsigned(10))
        .map(Part::Count);

    let interval = kw(KW_RRULE_INTERVAL)
        .ignore_then(bounded(10, 1, u32::MAX))
        .map(Part::Interval);

    let by_second = kw(KW_RRULE_BYSECOND)
        .ignore_then(list(bounded(2, 0, 60)))
        .map(Part::BySecond);

    let by_minute = kw(KW_RRULE_BYMINUTE)
        .ignore_then(list(bounded(2, 0, 59)))
        .map(Part::ByMinute);

    let by_hour = kw(KW_RRULE_BYHOUR)
        .ignore_then(list(bounded(2, 0, 23)))
        .map(Part::ByHour);

    let by_day = kw(KW_RRULE_BYDAY)
        .ignore_then(list(weekdaynum()))
        .map(Part::ByDay);

    let by_month_day = kw(KW_RRULE_BYMONTHDAY)
        .ignore_then(list(ordinal(2, 31)))
        .map(Part::ByMonthDay);

    let by_year_day = kw(KW_RRULE_BYYEARDAY)
        .ignore_then(list(ordinal(3, 366)))
        .map(Part::ByYearDay);

    let by_week_no = kw(KW_RRULE_BYWEEKNO)
        .ignore_then(list(ordinal(2, 53)))
        .map(Part::ByWeekNo);

    let by_month = kw(KW_RRULE_BYMONTH)
        .ignore_then(list(bounded(2, 1, 12)))
        .map(Part::ByMonth);

    let by_set_pos = kw(KW_RRULE_BYSETPOS)
        .ignore_then(list(ordinal(3, 366)))
        .map(Part::BySetPos);

    let wkst = kw(KW_RRULE_WKST).ignore_then(weekday()).map(Part::Wkst);

    choice((
        freq,
        until,
        count,
        interval,
        by_second,
        by_minute,
        by_hour,
        by_day,
        by_month_day,
        by_year_day,
        by_week_no,
        by_month,
        by_set_pos,
        wkst,
    ))
}

/// ```txt
/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
/// ```
fn freq<'src, I, E>() -> impl Parser<'src, I, RecurrenceFrequency, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_RRULE_FREQ_SECONDLY).to(RecurrenceFrequency::Secondly),
        just(KW_RRULE_FREQ_MINUTELY).to(RecurrenceFrequency::Minutely),
        just(KW_RRULE_FREQ_HOURLY).to(RecurrenceFrequency::Hourly),
        just(KW_RRULE_FREQ_DAILY).to(RecurrenceFrequency::Daily),
        just(KW_RRULE_FREQ_WEEKLY).to(RecurrenceFrequency::Weekly),
        just(KW_RRULE_FREQ_MONTHLY).to(RecurrenceFrequency::Monthly),
        just(KW_RRULE_FREQ_YEARLY).to(RecurrenceFrequency::Yearly),
    ))
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn weekdaynum<'src, I, E>() -> impl Parser<'src, I, WeekDayNum, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    ordinal(2, 53)
        .or_not()
        .then(weekday())
        .map(|(occurrence, day)| WeekDayNum { day, occurrence })
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src, I, E>() -> impl Parser<'src, I, Weekday, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_DAY_SU).to(Weekday::Sunday),
        just(KW_DAY_MO).to(Weekday::Monday),
        just(KW_DAY_TU).to(Weekday::Tuesday),
        just(KW_DAY_WE).to(Weekday::Wednesday),
        just(KW_DAY_TH).to(Weekday::Thursday),
        just(KW_DAY_FR).to(Weekday::Friday),
        just(KW_DAY_SA).to(Weekday::Saturday),
    ))
}

fn list<'src, I, E, T, P>(item: P) -> impl Parser<'src, I, Vec<T>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    P: Parser<'src, I, T, E>,
{
    item.separated_by(just(',')).at_least(1).collect()
}

/// Unsigned number in `min..=max`, e.g. `seconds = 1*2DIGIT ;0 to 60`.
fn bounded<'src, I, E, T>(max_digits: usize, min: u32, max: u32) -> impl Parser<'src, I, T, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
    T: TryFrom<u32>,
{
    unsigned(max_digits).try_map(move |n, span| {
        (min..=max)
            .contains(&n)
            .then(|| T::try_from(n).ok())
            .flatten()
            .ok_or_else(|| E::Error::expected_found([ValueExpected::RRuleOutOfRange], None, span))
    })
}

/// Signed non-zero ordinal in `-max..=max`, e.g.
/// `monthdaynum = [plus / minus] ordmoday`.
fn ordinal<'src, I, E, T>(max_digits: usize, max: u32) -> impl Parser<'src, I, T, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
    T: TryFrom<i64>,
{
    is_positive()
        .then(unsigned(max_digits))
        .try_map(move |(positive, n), span| {
            let n = i64::from(n);
            (1..=i64::from(max))
                .contains(&n)
                .then(|| T::try_from(if positive { n } else { -n }).ok())
                .flatten()
                .ok_or_else(|| {
                    E::Error::expected_found([ValueExpected::RRuleOutOfRange], None, span)
                })
        })
}

#[cfg(test)]
mod tests {
    #![expect(clippy::indexing_slicing)]

    use chumsky::extra;

    use super::*;

    fn parse(src: &'_ str) -> Result<RecurrenceRule, Vec<Rich<'_, char>>> {
        value_rrule::<'_, _, extra::Err<_>>()
            .parse(src)
            .into_result()
    }

    #[test]
    fn parses_rrule_freq_only() {
        let freqs = [
            ("FREQ=SECONDLY", RecurrenceFrequency::Secondly),
            ("FREQ=MINUTELY", RecurrenceFrequency::Minutely),
            ("FREQ=HOURLY", RecurrenceFrequency::Hourly),
            ("FREQ=DAILY", RecurrenceFrequency::Daily),
            ("FREQ=WEEKLY", RecurrenceFrequency::Weekly),
            ("FREQ=MONTHLY", RecurrenceFrequency::Monthly),
            ("FREQ=YEARLY", RecurrenceFrequency::Yearly),
        ];

        for (src, expected_freq) in freqs {
            let result = parse(src).unwrap();
            assert_eq!(result.freq, expected_freq, "Failed for {src}");
            assert_eq!(result.freq.to_string(), src.trim_start_matches("FREQ="));
            assert!(result.until.is_none());
            assert!(result.count.is_none());
            assert!(result.interval.is_none());
        }
    }

    #[test]
    fn parses_timezone_transition_rules() {
        let result = parse("FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU").unwrap();
        assert_eq!(result.freq, RecurrenceFrequency::Yearly);
        assert_eq!(result.by_month, [10]);
        assert_eq!(result.by_day, [WeekDayNum {
            day: Weekday::Sunday,
            occurrence: Some(-1),
        }]);

        let result = parse("FREQ=YEARLY;BYDAY=2SU;BYMONTH=3").unwrap();
        assert_eq!(result.by_month, [3]);
        assert_eq!(result.by_day[0].occurrence, Some(2));
    }

    #[test]
    fn parses_rrule_with_until() {
        let result = parse("FREQ=DAILY;UNTIL=19971224T000000Z").unwrap();
        let until = result.until.unwrap();
        assert!(until.utc && until.has_time);
        assert_eq!(until.date_time, jiff::civil::datetime(1997, 12, 24, 0, 0, 0, 0));

        let result = parse("FREQ=DAILY;UNTIL=19971224").unwrap();
        let until = result.until.unwrap();
        assert!(!until.utc && !until.has_time);
    }

    #[test]
    fn parses_rrule_with_byday() {
        let result = parse("FREQ=WEEKLY;BYDAY=MO,WE,FR").unwrap();
        let days: Vec<_> = result.by_day.iter().map(|d| d.day).collect();
        assert_eq!(days, [Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
        assert!(result.by_day.iter().all(|d| d.occurrence.is_none()));

        let result = parse("FREQ=MONTHLY;BYDAY=1MO,+2TU,-1FR").unwrap();
        let occurrences: Vec<_> = result.by_day.iter().map(|d| d.occurrence).collect();
        assert_eq!(occurrences, [Some(1), Some(2), Some(-1)]);
    }

    #[test]
    fn parses_rrule_complex() {
        // Example from RFC 5545
        let src = "FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU;BYHOUR=8,9;BYMINUTE=30";
        let result = parse(src).unwrap();
        assert_eq!(result.freq, RecurrenceFrequency::Yearly);
        assert_eq!(result.interval, Some(2));
        assert_eq!(result.by_month, [1]);
        assert_eq!(result.by_day.len(), 1);
        assert_eq!(result.by_hour, [8, 9]);
        assert_eq!(result.by_minute, [30]);

        let src = "FREQ=MONTHLY;COUNT=10;BYMONTHDAY=1,-1;BYSETPOS=-1;BYYEARDAY=366;BYWEEKNO=-53;BYSECOND=60;WKST=SU";
        let result = parse(src).unwrap();
        assert_eq!(result.count, Some(10));
        assert_eq!(result.by_month_day, [1, -1]);
        assert_eq!(result.by_set_pos, [-1]);
        assert_eq!(result.by_year_day, [366]);
        assert_eq!(result.by_week_no, [-53]);
        assert_eq!(result.by_second, [60]);
        assert_eq!(result.wkst, Some(Weekday::Sunday));
    }

    #[test]
    fn rejects_invalid_rules() {
        let fail_cases = [
            "INTERVAL=2;COUNT=10",                        // missing FREQ
            "FREQ=DAILY;UNTIL=19971224T000000Z;COUNT=10", // UNTIL with COUNT
            "FREQ=DAILY;FREQ=WEEKLY",                     // duplicate FREQ
            "FREQ=WEEKLY;BYDAY=MO;BYDAY=FR",              // duplicate BYDAY
            "FREQ=DAILY;INTERVAL=0",                      // zero interval
            "FREQ=YEARLY;BYMONTH=13",                     // month out of range
            "FREQ=YEARLY;BYMONTH=0",                      // month out of range
            "FREQ=DAILY;BYHOUR=24",                       // hour out of range
            "FREQ=MONTHLY;BYMONTHDAY=0",                  // zero ordinal
            "FREQ=MONTHLY;BYDAY=54MO",                    // week ordinal out of range
            "FREQ=FORTNIGHTLY",                           // unknown frequency
            "FREQ=DAILY;",                                // trailing separator
            "",                                           // empty
        ];
        for src in fail_cases {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn accepts_parts_in_any_order() {
        let result = parse("COUNT=10;INTERVAL=2;FREQ=DAILY").unwrap();
        assert_eq!(result.freq, RecurrenceFrequency::Daily);
        assert_eq!(result.count, Some(10));
        assert_eq!(result.interval, Some(2));
    }
}
