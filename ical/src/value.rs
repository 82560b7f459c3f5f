// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed property values and the built-in value parsers.
//!
//! The properties in an iCalendar object are strongly typed. The value type
//! of a property is either implied by its name or given explicitly with the
//! `VALUE` parameter, see RFC 5545 Section 3.3. Each [`ValueType`] has a
//! [`ValueParser`] registered in the context's
//! [`ValueParserRegistry`](crate::ValueParserRegistry).

mod datetime;
mod digit;
mod rrule;
mod text;

use std::borrow::Cow;
use std::ops::Range;

use chumsky::error::RichPattern;
use chumsky::prelude::*;
use jiff::tz::Offset;

pub use datetime::ValueDateTime;
pub use rrule::{RecurrenceFrequency, RecurrenceRule, WeekDayNum};

use crate::context::Context;
use crate::datetime::DateTimeValue;
use crate::keyword::KW_TZID;
use crate::syntax::{LineParameter, find_parameter};
use crate::value::datetime::{value_utc_offset, values_date, values_date_time};
use crate::value::rrule::value_rrule;
use crate::value::text::{value_text, values_integer};

/// Value data types understood by the built-in parsers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ValueType {
    /// Human-readable text, RFC 5545 Section 3.3.11
    #[strum(serialize = "TEXT")]
    Text,

    /// Calendar date, RFC 5545 Section 3.3.4
    #[strum(serialize = "DATE")]
    Date,

    /// Date with local time, UTC time or local time and zone reference,
    /// RFC 5545 Section 3.3.5
    #[strum(serialize = "DATE-TIME")]
    DateTime,

    /// Offset from UTC to local time, RFC 5545 Section 3.3.14
    #[strum(serialize = "UTC-OFFSET")]
    UtcOffset,

    /// Recurrence rule, RFC 5545 Section 3.3.10
    #[strum(serialize = "RECUR")]
    Recur,

    /// Signed integer, RFC 5545 Section 3.3.8
    #[strum(serialize = "INTEGER")]
    Integer,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Unescaped text
    Text(String),

    /// Signed integer
    Integer(i32),

    /// Date or date-time; date values have no time part
    DateTime(DateTimeValue),

    /// UTC offset
    UtcOffset(Offset),

    /// Recurrence rule
    Recur(RecurrenceRule),
}

impl PropertyValue {
    /// The text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The date-time, if this is a date or date-time value.
    #[must_use]
    pub const fn as_date_time(&self) -> Option<&DateTimeValue> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// The offset, if this is a UTC offset value.
    #[must_use]
    pub const fn as_utc_offset(&self) -> Option<Offset> {
        match self {
            Self::UtcOffset(offset) => Some(*offset),
            _ => None,
        }
    }

    /// The rule, if this is a recurrence rule value.
    #[must_use]
    pub const fn as_recur(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::Recur(rule) => Some(rule),
            _ => None,
        }
    }
}

/// The raw, still untyped value of a property line.
#[derive(Debug, Clone, Copy)]
pub struct RawValue<'a> {
    /// Property name
    pub property: &'a str,

    /// Property parameters
    pub parameters: &'a [LineParameter],

    /// Raw value text
    pub text: &'a str,
}

impl RawValue<'_> {
    /// Find the first parameter with the given name, case-insensitively.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&LineParameter> {
        find_parameter(self.parameters, name)
    }
}

/// Parser turning a raw value into one or more typed values.
pub type ValueParser = fn(&RawValue<'_>, &Context) -> Result<Vec<PropertyValue>, ValueError>;

/// A typed value that does not match its value type grammar.
///
/// ## Examples
///
/// Errors carry the byte span inside the raw value, suitable for rendering
/// with a diagnostics crate:
///
/// ```
/// # use tzcal_ical::{Context, RawValue, ValueType};
/// use ariadne::{Color, Label, Report, ReportKind, Source};
/// let ctx = Context::new();
/// let raw = RawValue {
///     property: "DTSTART",
///     parameters: &[],
///     text: "20250230T090000",
/// };
/// let parser = ctx.services().parsers().get(ValueType::DateTime);
/// let err = parser(&raw, &ctx).unwrap_err();
///
/// Report::build(ReportKind::Error, err.span.clone())
///     .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
///     .with_message(err.to_string())
///     .with_label(
///         Label::new(err.span.clone())
///             .with_message(&err.reason)
///             .with_color(Color::Red),
///     )
///     .finish()
///     .eprint(Source::from(raw.text))
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {value_type} value '{text}': {reason}")]
pub struct ValueError {
    /// The value type that was expected
    pub value_type: ValueType,

    /// The raw value text
    pub text: String,

    /// What the grammar expected
    pub reason: String,

    /// Byte range of the offending part of the raw value
    pub span: Range<usize>,
}

impl ValueError {
    fn from_rich(value_type: ValueType, text: &str, errs: Vec<Rich<'_, char>>) -> Self {
        let (reason, span) = match errs.into_iter().next() {
            Some(err) => (err.to_string(), err.span().into_range()),
            None => ("invalid value".to_owned(), 0..text.len()),
        };
        Self {
            value_type,
            text: text.to_owned(),
            reason,
            span,
        }
    }
}

/// Failure reasons when a specific value was expected but not found.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueExpected {
    /// A valid calendar date was expected
    Date,
    /// A 32-bit signed integer value was expected
    I32,
    /// A 32-bit unsigned integer value was expected
    U32,
    /// A UTC offset within the supported range was expected
    UtcOffset,
    /// A rule part appeared more than once
    RRuleDuplicatePart,
    /// The FREQ rule part is missing
    RRuleRequiredFreq,
    /// UNTIL and COUNT appeared together
    RRuleCountUntilExclusion,
    /// A rule part number is outside its allowed range
    RRuleOutOfRange,
}

impl From<ValueExpected> for RichPattern<'_, char> {
    fn from(expected: ValueExpected) -> Self {
        match expected {
            ValueExpected::Date => Self::Label(Cow::Borrowed("invalid date")),
            ValueExpected::I32 => Self::Label(Cow::Borrowed("i32 out of range")),
            ValueExpected::U32 => Self::Label(Cow::Borrowed("u32 out of range")),
            ValueExpected::UtcOffset => Self::Label(Cow::Borrowed("utc offset out of range")),
            ValueExpected::RRuleDuplicatePart => {
                Self::Label(Cow::Borrowed("rrule part must not occur more than once"))
            }
            ValueExpected::RRuleRequiredFreq => {
                Self::Label(Cow::Borrowed("rrule FREQ part is required"))
            }
            ValueExpected::RRuleCountUntilExclusion => Self::Label(Cow::Borrowed(
                "rrule UNTIL and COUNT must not occur together",
            )),
            ValueExpected::RRuleOutOfRange => {
                Self::Label(Cow::Borrowed("rrule part number out of range"))
            }
        }
    }
}

fn run<'a, T>(
    value_type: ValueType,
    text: &'a str,
    parser: impl Parser<'a, &'a str, T, extra::Err<Rich<'a, char>>>,
) -> Result<T, ValueError> {
    parser
        .parse(text)
        .into_result()
        .map_err(|errs| ValueError::from_rich(value_type, text, errs))
}

/// Parse a `TEXT` value, unescaping it.
///
/// ## Errors
///
/// Fails on an unknown or dangling escape sequence.
pub fn parse_text(raw: &RawValue<'_>, _ctx: &Context) -> Result<Vec<PropertyValue>, ValueError> {
    let text = run(ValueType::Text, raw.text, value_text())?;
    Ok(vec![PropertyValue::Text(text)])
}

/// Parse a comma-separated list of `INTEGER` values.
///
/// ## Errors
///
/// Fails if an item is not a 32-bit signed integer.
pub fn parse_integer(raw: &RawValue<'_>, _ctx: &Context) -> Result<Vec<PropertyValue>, ValueError> {
    let values = run(ValueType::Integer, raw.text, values_integer())?;
    Ok(values.into_iter().map(PropertyValue::Integer).collect())
}

/// Parse a comma-separated list of `DATE` values.
///
/// ## Errors
///
/// Fails if an item is not a valid calendar date.
pub fn parse_date(raw: &RawValue<'_>, ctx: &Context) -> Result<Vec<PropertyValue>, ValueError> {
    let values = run(ValueType::Date, raw.text, values_date())?;
    Ok(values
        .into_iter()
        .map(|v| PropertyValue::DateTime(bind(v, raw, ctx)))
        .collect())
}

/// Parse a comma-separated list of `DATE-TIME` values.
///
/// A trailing `Z` makes a UTC value. Otherwise a `TZID` parameter binds the
/// zone identifier, together with the context's cached engine for that
/// identifier if there is one.
///
/// ## Errors
///
/// Fails if an item is neither a valid date-time nor a valid date.
pub fn parse_date_time(raw: &RawValue<'_>, ctx: &Context) -> Result<Vec<PropertyValue>, ValueError> {
    let values = run(ValueType::DateTime, raw.text, values_date_time())?;
    Ok(values
        .into_iter()
        .map(|v| PropertyValue::DateTime(bind(v, raw, ctx)))
        .collect())
}

/// Parse a `UTC-OFFSET` value.
///
/// ## Errors
///
/// Fails if the value is not a valid offset.
pub fn parse_utc_offset(
    raw: &RawValue<'_>,
    _ctx: &Context,
) -> Result<Vec<PropertyValue>, ValueError> {
    let offset = run(ValueType::UtcOffset, raw.text, value_utc_offset())?;
    Ok(vec![PropertyValue::UtcOffset(offset)])
}

/// Parse a `RECUR` value.
///
/// ## Errors
///
/// Fails on malformed, duplicate or conflicting rule parts.
pub fn parse_recur(raw: &RawValue<'_>, _ctx: &Context) -> Result<Vec<PropertyValue>, ValueError> {
    let rule = run(ValueType::Recur, raw.text, value_rrule())?;
    Ok(vec![PropertyValue::Recur(rule)])
}

fn bind(parsed: ValueDateTime, raw: &RawValue<'_>, ctx: &Context) -> DateTimeValue {
    let tzid = raw.parameter(KW_TZID).and_then(LineParameter::first);
    let value = match (parsed.utc, tzid) {
        (true, _) => DateTimeValue::utc(parsed.date_time),
        (false, Some(tzid)) => match ctx.timezone(tzid) {
            Some(engine) => DateTimeValue::with_engine(parsed.date_time, tzid, engine)
                .unwrap_or_else(|_| DateTimeValue::in_zone(parsed.date_time, tzid)),
            None => DateTimeValue::in_zone(parsed.date_time, tzid),
        },
        (false, None) => DateTimeValue::new(parsed.date_time),
    }
    .with_has_time(parsed.has_time);

    if let Some(association) = ctx.peek() {
        value.associate(association.clone());
    }
    value
}
