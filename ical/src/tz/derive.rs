// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Derive a [`TimezoneEngine`] from a `VTIMEZONE` component.
//!
//! Only two shapes are supported: a single sub-period with a constant
//! offset, and two sub-periods each recurring yearly on the nth weekday of
//! one month. Anything else is rejected with the violated constraint.

use jiff::civil::{self, Weekday};
use jiff::tz::Offset;

use crate::component::{ComponentKind, Property, StructuralNode};
use crate::keyword::{
    KW_DTSTART, KW_EXDATE, KW_EXRULE, KW_RDATE, KW_RRULE, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE,
    KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO,
    KW_RRULE_BYYEARDAY, KW_TZID, KW_TZOFFSETFROM, KW_TZOFFSETTO,
};
use crate::tz::engine::TimezoneEngine;
use crate::tz::rule::{AnnualRule, TransitionRule};
use crate::value::{PropertyValue, RecurrenceFrequency, RecurrenceRule};

/// Why a `VTIMEZONE` has no engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The node is some other component
    #[error("not a VTIMEZONE component: {name}")]
    NotTimezone {
        /// Name of the node
        name: String,
    },

    /// No usable `TZID` property
    #[error("missing TZID property")]
    MissingTzid,

    /// Neither one nor two sub-periods
    #[error("unsupported VTIMEZONE shape: {count} sub-periods")]
    UnsupportedShape {
        /// Number of `STANDARD` and `DAYLIGHT` children
        count: usize,
    },

    /// A required property is absent or has the wrong type
    #[error("{period} sub-period is missing {property}")]
    MissingProperty {
        /// Sub-period name
        period: String,
        /// Property name
        property: &'static str,
    },

    /// The sub-period has `EXDATE`
    #[error("{period} sub-period has exception dates")]
    ExceptionDates {
        /// Sub-period name
        period: String,
    },

    /// The sub-period has `EXRULE`
    #[error("{period} sub-period has exception rules")]
    ExceptionRules {
        /// Sub-period name
        period: String,
    },

    /// The sub-period has `RDATE`
    #[error("{period} sub-period has extra recurrence dates")]
    ExtraRecurrenceDates {
        /// Sub-period name
        period: String,
    },

    /// The only sub-period recurs
    #[error("single sub-period must not have a recurrence rule")]
    RecurrenceRuleOnFixed,

    /// The only sub-period changes the offset
    #[error("single sub-period offsets differ: from {from} to {to}")]
    OffsetMismatch {
        /// `TZOFFSETFROM`
        from: Offset,
        /// `TZOFFSETTO`
        to: Offset,
    },

    /// The sub-period has no `RRULE`
    #[error("{period} sub-period has no recurrence rule")]
    MissingRecurrenceRule {
        /// Sub-period name
        period: String,
    },

    /// The sub-period has more than one `RRULE`
    #[error("{period} sub-period has {count} recurrence rules, expected one")]
    MultipleRecurrenceRules {
        /// Sub-period name
        period: String,
        /// Number of rules
        count: usize,
    },

    /// The `RRULE` value did not parse as a recurrence rule
    #[error("{period} sub-period has a malformed recurrence rule")]
    MalformedRecurrenceRule {
        /// Sub-period name
        period: String,
    },

    /// The rule is bounded by `UNTIL`
    #[error("{period} sub-period recurrence rule must not have UNTIL")]
    UntilBound {
        /// Sub-period name
        period: String,
    },

    /// The rule is not `FREQ=YEARLY;INTERVAL=1`
    #[error("{period} sub-period recurrence rule must be yearly with interval 1, found {freq} with interval {interval}")]
    UnsupportedFrequency {
        /// Sub-period name
        period: String,
        /// Rule frequency
        freq: RecurrenceFrequency,
        /// Rule interval
        interval: u32,
    },

    /// The rule has a `BY*` part other than `BYMONTH` and `BYDAY`
    #[error("{period} sub-period recurrence rule must not have {part}")]
    UnsupportedByRule {
        /// Sub-period name
        period: String,
        /// Rule part name
        part: &'static str,
    },

    /// The rule does not have exactly one `BYMONTH` value
    #[error("{period} sub-period recurrence rule has {count} BYMONTH values, expected one")]
    ByMonthCount {
        /// Sub-period name
        period: String,
        /// Number of values
        count: usize,
    },

    /// The rule does not have exactly one `BYDAY` value
    #[error("{period} sub-period recurrence rule has {count} BYDAY values, expected one")]
    ByDayCount {
        /// Sub-period name
        period: String,
        /// Number of values
        count: usize,
    },

    /// The `BYDAY` week ordinal is missing or outside -1 and 1 to 5
    #[error("{period} sub-period recurrence rule has unsupported BYDAY week offset {offset:?}")]
    WeekOffset {
        /// Sub-period name
        period: String,
        /// The ordinal, if any
        offset: Option<i8>,
    },

    /// Offset arithmetic left the supported range
    #[error("derived offset is out of range")]
    OffsetOutOfRange,
}

/// Derive an engine from a `VTIMEZONE` node.
///
/// Every rejection is logged as a warning along with the zone identifier.
///
/// ## Errors
///
/// Returns the first violated constraint if the node has an unsupported
/// shape. This is a normal outcome, values referring to the zone then fall
/// back to the zone database.
pub fn derive(node: &StructuralNode) -> Result<TimezoneEngine, Rejection> {
    let result = derive_engine(node);
    if let Err(rejection) = &result {
        tracing::warn!(
            tzid = tzid_of(node).unwrap_or_default(),
            reason = %rejection,
            "cannot derive timezone engine"
        );
    }
    result
}

fn derive_engine(node: &StructuralNode) -> Result<TimezoneEngine, Rejection> {
    if node.kind != ComponentKind::Timezone {
        return Err(Rejection::NotTimezone {
            name: node.name.clone(),
        });
    }
    let tzid = tzid_of(node).ok_or(Rejection::MissingTzid)?;

    let periods: Vec<_> = node
        .children
        .iter()
        .filter(|c| matches!(c.kind, ComponentKind::Standard | ComponentKind::Daylight))
        .collect();

    match periods.as_slice() {
        [only] => derive_fixed(tzid, only),
        [first, second] => derive_annual(tzid, first, second),
        _ => Err(Rejection::UnsupportedShape {
            count: periods.len(),
        }),
    }
}

fn tzid_of(node: &StructuralNode) -> Option<&str> {
    node.property(KW_TZID)
        .and_then(Property::value)
        .and_then(PropertyValue::as_text)
        .filter(|tzid| !tzid.is_empty())
}

fn derive_fixed(tzid: &str, period: &StructuralNode) -> Result<TimezoneEngine, Rejection> {
    if period.kind != ComponentKind::Standard {
        tracing::warn!(
            tzid,
            period = %period.name,
            "single sub-period VTIMEZONE is not labelled STANDARD"
        );
    }

    reject_exceptions(period)?;
    if period.property(KW_RRULE).is_some() {
        return Err(Rejection::RecurrenceRuleOnFixed);
    }

    let from = offset(period, KW_TZOFFSETFROM)?;
    let to = offset(period, KW_TZOFFSETTO)?;
    if from != to {
        return Err(Rejection::OffsetMismatch { from, to });
    }

    Ok(TimezoneEngine::fixed(tzid, to))
}

fn derive_annual(
    tzid: &str,
    first: &StructuralNode,
    second: &StructuralNode,
) -> Result<TimezoneEngine, Rejection> {
    let first = Period::validate(first)?;
    let second = Period::validate(second)?;

    // The period with the smaller month carries the delta.
    let (standard, daylight) = if first.rule.month < second.rule.month {
        (second, first)
    } else {
        (first, second)
    };

    if daylight.kind == ComponentKind::Standard {
        tracing::warn!(
            tzid,
            month = daylight.rule.month,
            "STANDARD sub-period carries the daylight delta"
        );
    }

    let delta = daylight.to.seconds() - daylight.from.seconds();
    let base = standard.to;
    let shifted =
        Offset::from_seconds(base.seconds() + delta).map_err(|_| Rejection::OffsetOutOfRange)?;

    let rule = AnnualRule {
        standard: base,
        daylight: shifted,
        start: daylight.rule,
        end: standard.rule,
        valid_from: standard.start.max(daylight.start),
    };
    Ok(TimezoneEngine::annual(tzid, rule))
}

/// A sub-period that passed validation.
#[derive(Debug)]
struct Period {
    kind: ComponentKind,
    from: Offset,
    to: Offset,
    start: civil::Date,
    rule: TransitionRule,
}

impl Period {
    fn validate(node: &StructuralNode) -> Result<Self, Rejection> {
        let period = || node.name.clone();

        reject_exceptions(node)?;

        let rules: Vec<_> = node.values(KW_RRULE).collect();
        let rule = match rules.as_slice() {
            [] => return Err(Rejection::MissingRecurrenceRule { period: period() }),
            [rule] => rule
                .as_recur()
                .ok_or_else(|| Rejection::MalformedRecurrenceRule { period: period() })?,
            _ => {
                return Err(Rejection::MultipleRecurrenceRules {
                    period: period(),
                    count: rules.len(),
                });
            }
        };
        let (month, week, weekday) = validate_rule(&node.name, rule)?;

        let from = offset(node, KW_TZOFFSETFROM)?;
        let to = offset(node, KW_TZOFFSETTO)?;
        let dtstart = node
            .values(KW_DTSTART)
            .find_map(PropertyValue::as_date_time)
            .ok_or_else(|| Rejection::MissingProperty {
                period: period(),
                property: KW_DTSTART,
            })?
            .value();

        Ok(Self {
            kind: node.kind,
            from,
            to,
            start: dtstart.date(),
            rule: TransitionRule {
                month,
                week,
                weekday,
                time: dtstart.time(),
            },
        })
    }
}

fn validate_rule(period: &str, rule: &RecurrenceRule) -> Result<(i8, i8, Weekday), Rejection> {
    let period = || period.to_owned();

    if rule.until.is_some() {
        return Err(Rejection::UntilBound { period: period() });
    }

    let interval = rule.interval.unwrap_or(1);
    if rule.freq != RecurrenceFrequency::Yearly || interval != 1 {
        return Err(Rejection::UnsupportedFrequency {
            period: period(),
            freq: rule.freq,
            interval,
        });
    }

    #[rustfmt::skip]
    let unsupported = [
        (KW_RRULE_BYHOUR,     rule.by_hour.is_empty()),
        (KW_RRULE_BYMINUTE,   rule.by_minute.is_empty()),
        (KW_RRULE_BYSECOND,   rule.by_second.is_empty()),
        (KW_RRULE_BYMONTHDAY, rule.by_month_day.is_empty()),
        (KW_RRULE_BYSETPOS,   rule.by_set_pos.is_empty()),
        (KW_RRULE_BYWEEKNO,   rule.by_week_no.is_empty()),
        (KW_RRULE_BYYEARDAY,  rule.by_year_day.is_empty()),
    ];
    if let Some((part, _)) = unsupported.into_iter().find(|(_, empty)| !empty) {
        return Err(Rejection::UnsupportedByRule {
            period: period(),
            part,
        });
    }

    let [month] = rule.by_month.as_slice() else {
        return Err(Rejection::ByMonthCount {
            period: period(),
            count: rule.by_month.len(),
        });
    };
    let [day] = rule.by_day.as_slice() else {
        return Err(Rejection::ByDayCount {
            period: period(),
            count: rule.by_day.len(),
        });
    };

    let week = match day.occurrence {
        Some(-1) => 5,
        Some(n @ 1..=5) => n,
        offset => {
            return Err(Rejection::WeekOffset {
                period: period(),
                offset,
            });
        }
    };

    Ok((*month, week, day.day))
}

fn reject_exceptions(node: &StructuralNode) -> Result<(), Rejection> {
    let period = node.name.clone();
    if node.property(KW_EXDATE).is_some() {
        Err(Rejection::ExceptionDates { period })
    } else if node.property(KW_EXRULE).is_some() {
        Err(Rejection::ExceptionRules { period })
    } else if node.property(KW_RDATE).is_some() {
        Err(Rejection::ExtraRecurrenceDates { period })
    } else {
        Ok(())
    }
}

fn offset(node: &StructuralNode, property: &'static str) -> Result<Offset, Rejection> {
    node.values(property)
        .find_map(PropertyValue::as_utc_offset)
        .ok_or_else(|| Rejection::MissingProperty {
            period: node.name.clone(),
            property,
        })
}
