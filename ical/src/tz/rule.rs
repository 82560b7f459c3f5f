// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::{self, Weekday};
use jiff::tz::Offset;
use jiff::{SignedDuration, Timestamp};

/// A floating transition: the nth weekday of a month at a wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Month of the year, 1 to 12
    pub month: i8,

    /// Week of the month, 1 to 5, where 5 means the last one
    pub week: i8,

    /// Day of the week
    pub weekday: Weekday,

    /// Wall-clock time of the transition
    pub time: civil::Time,
}

impl TransitionRule {
    /// The wall-clock instant of this transition in the given year.
    ///
    /// ## Errors
    ///
    /// Fails if the year or month is outside jiff's supported range.
    pub fn local_in(&self, year: i16) -> Result<civil::DateTime, jiff::Error> {
        let nth = if self.week >= 5 { -1 } else { self.week };
        let day = civil::Date::new(year, self.month, 1)?.nth_weekday_of_month(nth, self.weekday)?;
        Ok(day.to_datetime(self.time))
    }
}

/// A two-transition yearly recurring offset rule.
///
/// Outside the delta period the `standard` offset applies. The delta period
/// begins at `start`, read in the standard offset, and ends at `end`, read in
/// the `daylight` offset. Before `valid_from` the standard offset applies all
/// year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualRule {
    /// Base offset
    pub standard: Offset,

    /// Offset during the delta period, the base offset plus the delta
    pub daylight: Offset,

    /// Transition into the delta period
    pub start: TransitionRule,

    /// Transition out of the delta period
    pub end: TransitionRule,

    /// First date the transitions apply
    pub valid_from: civil::Date,
}

impl AnnualRule {
    /// Signed difference between the daylight and the standard offset.
    #[must_use]
    pub fn delta(&self) -> SignedDuration {
        SignedDuration::from_secs(i64::from(
            self.daylight.seconds() - self.standard.seconds(),
        ))
    }

    /// Whether the delta period is in effect at the given instant.
    #[must_use]
    pub fn is_daylight(&self, ts: Timestamp) -> bool {
        let local = self.standard.to_datetime(ts);
        if local.date() < self.valid_from {
            return false;
        }

        let (Ok(start), Ok(end)) = (self.start_in(local.year()), self.end_in(local.year())) else {
            return false;
        };

        match start.cmp(&end) {
            std::cmp::Ordering::Equal => false,
            std::cmp::Ordering::Less => start <= ts && ts < end,
            std::cmp::Ordering::Greater => ts >= start || ts < end,
        }
    }

    /// The offset in effect at the given instant.
    #[must_use]
    pub fn offset_at(&self, ts: Timestamp) -> Offset {
        if self.is_daylight(ts) {
            self.daylight
        } else {
            self.standard
        }
    }

    /// Convert a wall-clock time to an instant.
    ///
    /// A wall-clock time in the spring-forward gap has no instant. One in the
    /// fall-back fold resolves to the standard offset.
    #[must_use]
    pub fn to_utc(&self, local: civil::DateTime) -> Option<Timestamp> {
        let as_standard = self
            .standard
            .to_timestamp(local)
            .ok()
            .filter(|ts| !self.is_daylight(*ts));
        let as_daylight = self
            .daylight
            .to_timestamp(local)
            .ok()
            .filter(|ts| self.is_daylight(*ts));
        as_standard.or(as_daylight)
    }

    fn start_in(&self, year: i16) -> Result<Timestamp, jiff::Error> {
        self.standard.to_timestamp(self.start.local_in(year)?)
    }

    fn end_in(&self, year: i16) -> Result<Timestamp, jiff::Error> {
        self.daylight.to_timestamp(self.end.local_in(year)?)
    }
}
