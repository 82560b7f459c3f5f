// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::Timestamp;
use jiff::civil;
use jiff::tz::Offset;

use crate::tz::rule::AnnualRule;

/// A wall-clock time that does not exist in a zone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("local time {local} does not exist in time zone {tzid}")]
pub struct InvalidLocalTime {
    /// Zone identifier
    pub tzid: String,

    /// The rejected wall-clock time
    pub local: civil::DateTime,
}

/// Offset behaviour of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// One constant offset, no transitions
    Fixed(Offset),

    /// Two transitions every year
    Annual(AnnualRule),
}

/// Converts between wall-clock times of one zone and instants.
///
/// Engines are immutable and shared as `Arc<TimezoneEngine>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneEngine {
    id: String,
    kind: EngineKind,
}

impl TimezoneEngine {
    /// A fixed-offset engine.
    pub fn fixed(id: impl Into<String>, offset: Offset) -> Self {
        Self {
            id: id.into(),
            kind: EngineKind::Fixed(offset),
        }
    }

    /// A two-transition annual engine.
    pub fn annual(id: impl Into<String>, rule: AnnualRule) -> Self {
        Self {
            id: id.into(),
            kind: EngineKind::Annual(rule),
        }
    }

    /// Zone identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Offset behaviour.
    #[must_use]
    pub const fn kind(&self) -> &EngineKind {
        &self.kind
    }

    /// The offset in effect at an instant.
    #[must_use]
    pub fn offset_at(&self, ts: Timestamp) -> Offset {
        match &self.kind {
            EngineKind::Fixed(offset) => *offset,
            EngineKind::Annual(rule) => rule.offset_at(ts),
        }
    }

    /// Whether the delta period is in effect at an instant.
    #[must_use]
    pub fn is_daylight(&self, ts: Timestamp) -> bool {
        match &self.kind {
            EngineKind::Fixed(_) => false,
            EngineKind::Annual(rule) => rule.is_daylight(ts),
        }
    }

    /// The wall-clock time at an instant. Always single-valued.
    #[must_use]
    pub fn to_local(&self, ts: Timestamp) -> civil::DateTime {
        self.offset_at(ts).to_datetime(ts)
    }

    /// The instant of a wall-clock time.
    ///
    /// ## Errors
    ///
    /// Fails for wall-clock times skipped by a forward transition. Times
    /// repeated by a backward transition resolve to the standard offset.
    pub fn to_utc(&self, local: civil::DateTime) -> Result<Timestamp, InvalidLocalTime> {
        let ts = match &self.kind {
            EngineKind::Fixed(offset) => offset.to_timestamp(local).ok(),
            EngineKind::Annual(rule) => rule.to_utc(local),
        };
        ts.ok_or_else(|| InvalidLocalTime {
            tzid: self.id.clone(),
            local,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday, date, datetime, time};

    use super::*;
    use crate::tz::rule::TransitionRule;

    fn new_york() -> TimezoneEngine {
        TimezoneEngine::annual(
            "America/New_York",
            AnnualRule {
                standard: Offset::constant(-5),
                daylight: Offset::constant(-4),
                start: TransitionRule {
                    month: 3,
                    week: 2,
                    weekday: Weekday::Sunday,
                    time: time(2, 0, 0, 0),
                },
                end: TransitionRule {
                    month: 11,
                    week: 1,
                    weekday: Weekday::Sunday,
                    time: time(2, 0, 0, 0),
                },
                valid_from: date(2007, 3, 11),
            },
        )
    }

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn converts_fixed_offsets() {
        let engine = TimezoneEngine::fixed("Europe/Moscow", Offset::constant(3));
        let local = datetime(2023, 10, 29, 3, 0, 0, 0);
        assert_eq!(engine.to_utc(local).unwrap(), ts("2023-10-29T00:00:00Z"));
        assert_eq!(engine.to_local(ts("2023-10-29T00:00:00Z")), local);
        assert!(!engine.is_daylight(ts("2023-07-01T00:00:00Z")));
    }

    #[test]
    fn converts_across_spring_forward() {
        let engine = new_york();

        #[rustfmt::skip]
        let cases = [
            (datetime(2023, 3, 12, 1, 59, 59, 0), "2023-03-12T06:59:59Z"),
            (datetime(2023, 3, 12, 3, 0, 0, 0),   "2023-03-12T07:00:00Z"),
        ];
        for (local, expected) in cases {
            assert_eq!(engine.to_utc(local).unwrap(), ts(expected), "{local}");
        }

        let err = engine.to_utc(datetime(2023, 3, 12, 2, 0, 0, 0)).unwrap_err();
        assert_eq!(err.tzid, "America/New_York");
        assert_eq!(
            err.to_string(),
            "local time 2023-03-12T02:00:00 does not exist in time zone America/New_York"
        );
    }

    #[test]
    fn converts_across_fall_back() {
        let engine = new_york();

        #[rustfmt::skip]
        let cases = [
            (datetime(2023, 11, 5, 0, 59, 59, 0), "2023-11-05T04:59:59Z"),
            (datetime(2023, 11, 5, 1, 0, 0, 0),   "2023-11-05T06:00:00Z"),
            (datetime(2023, 11, 5, 2, 0, 0, 0),   "2023-11-05T07:00:00Z"),
        ];
        for (local, expected) in cases {
            assert_eq!(engine.to_utc(local).unwrap(), ts(expected), "{local}");
        }
    }

    #[test]
    fn utc_to_local_is_single_valued() {
        let engine = new_york();
        assert_eq!(
            engine.to_local(ts("2023-11-05T05:30:00Z")),
            datetime(2023, 11, 5, 1, 30, 0, 0)
        );
        assert_eq!(
            engine.to_local(ts("2023-11-05T06:30:00Z")),
            datetime(2023, 11, 5, 1, 30, 0, 0)
        );
        assert_eq!(engine.offset_at(ts("2023-07-01T00:00:00Z")), Offset::constant(-4));
    }
}
