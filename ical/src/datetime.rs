// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Timezone-aware date and date-time values.
//!
//! A [`DateTimeValue`] is a wall-clock reading plus whatever is known about
//! its zone. The instant it denotes is resolved lazily and cached:
//!
//! 1. through the bound [`TimezoneEngine`], strictly;
//! 2. through the zone database for a zone identifier, leniently;
//! 3. as UTC for UTC values;
//! 4. through the host zone otherwise.
//!
//! Values are immutable. Arithmetic and re-zoning return new values that
//! carry the zone binding along.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::sync::{Arc, OnceLock};

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Span, Timestamp, Zoned, civil};

use crate::context::Association;
use crate::tz::{InvalidLocalTime, TimezoneEngine};

const NANOS_PER_DAY: i128 = 86_400 * 1_000_000_000;

/// How a value without a zone identifier is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The wall-clock reading is UTC
    Utc,

    /// A wall-clock reading produced by re-zoning
    HostLocal,

    /// Floating, interpreted in the host zone
    Unspecified,
}

/// Errors from resolving or transforming a [`DateTimeValue`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum DateTimeError {
    /// The zone identifier and the bound engine disagree
    #[error("zone identifier {tzid} does not match engine {engine}")]
    ArgumentContract {
        /// The zone identifier
        tzid: String,
        /// Identifier of the engine
        engine: String,
    },

    /// The wall-clock time is skipped in the bound engine's zone
    #[error(transparent)]
    InvalidLocalTime(#[from] InvalidLocalTime),

    /// The zone database has no such zone
    #[error("unknown time zone {tzid}: {source}")]
    UnknownZone {
        /// The zone identifier
        tzid: String,
        /// Lookup failure
        source: jiff::Error,
    },

    /// Calendar arithmetic or conversion left the supported range
    #[error("date-time out of range: {0}")]
    OutOfRange(#[from] jiff::Error),

    /// A zone identifier is required but empty
    #[error("time zone identifier must not be empty")]
    EmptyZoneId,
}

/// A date or date-time with optional zone binding.
#[derive(Debug, Clone)]
pub struct DateTimeValue {
    value: civil::DateTime,
    origin: Origin,
    has_date: bool,
    has_time: bool,
    tzid: Option<String>,
    engine: Option<Arc<TimezoneEngine>>,
    utc: OnceLock<Result<Timestamp, DateTimeError>>,
    association: OnceLock<Association>,
}

impl DateTimeValue {
    fn build(
        value: civil::DateTime,
        origin: Origin,
        tzid: Option<String>,
        engine: Option<Arc<TimezoneEngine>>,
    ) -> Self {
        Self {
            value,
            origin,
            has_date: true,
            has_time: value.time() != civil::Time::midnight(),
            tzid,
            engine,
            utc: OnceLock::new(),
            association: OnceLock::new(),
        }
    }

    /// A floating value, interpreted in the host zone.
    ///
    /// The value has a time part unless it is exactly midnight.
    #[must_use]
    pub fn new(value: civil::DateTime) -> Self {
        Self::build(value, Origin::Unspecified, None, None)
    }

    /// A UTC value.
    #[must_use]
    pub fn utc(value: civil::DateTime) -> Self {
        Self::build(value, Origin::Utc, None, None)
    }

    /// A date without time part.
    #[must_use]
    pub fn from_date(date: civil::Date) -> Self {
        Self::new(date.to_datetime(civil::Time::midnight())).with_has_time(false)
    }

    /// A value in a zone resolved through the zone database.
    pub fn in_zone(value: civil::DateTime, tzid: impl Into<String>) -> Self {
        Self::build(value, Origin::Unspecified, Some(tzid.into()), None)
    }

    /// A value in a zone resolved strictly through an engine.
    ///
    /// ## Errors
    ///
    /// Fails with [`DateTimeError::ArgumentContract`] if the engine is for a
    /// different zone.
    pub fn with_engine(
        value: civil::DateTime,
        tzid: impl Into<String>,
        engine: Arc<TimezoneEngine>,
    ) -> Result<Self, DateTimeError> {
        let tzid = tzid.into();
        if engine.id() != tzid {
            return Err(DateTimeError::ArgumentContract {
                tzid,
                engine: engine.id().to_owned(),
            });
        }
        Ok(Self::build(value, Origin::Unspecified, Some(tzid), Some(engine)))
    }

    /// Override whether the value has a time part.
    #[must_use]
    pub fn with_has_time(mut self, has_time: bool) -> Self {
        self.has_time = has_time;
        self
    }

    /// Override whether the value has a date part.
    #[must_use]
    pub fn with_has_date(mut self, has_date: bool) -> Self {
        self.has_date = has_date;
        self
    }

    /// The wall-clock reading.
    #[must_use]
    pub const fn value(&self) -> civil::DateTime {
        self.value
    }

    /// How the reading is interpreted without a zone.
    #[must_use]
    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether this is a UTC value.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        self.origin == Origin::Utc
    }

    /// Whether the value has a date part.
    #[must_use]
    pub const fn has_date(&self) -> bool {
        self.has_date
    }

    /// Whether the value has a time part.
    #[must_use]
    pub const fn has_time(&self) -> bool {
        self.has_time
    }

    /// The zone identifier, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.tzid.as_deref()
    }

    /// The bound engine, if any.
    #[must_use]
    pub fn engine(&self) -> Option<&Arc<TimezoneEngine>> {
        self.engine.as_ref()
    }

    /// The instant this value denotes. Computed once and cached.
    ///
    /// ## Errors
    ///
    /// Fails if the bound engine rejects the wall-clock time, if the zone
    /// identifier is unknown, or if the instant is out of range.
    pub fn resolve_utc(&self) -> Result<Timestamp, DateTimeError> {
        self.utc.get_or_init(|| self.compute_utc()).clone()
    }

    fn compute_utc(&self) -> Result<Timestamp, DateTimeError> {
        if let Some(engine) = &self.engine {
            return Ok(engine.to_utc(self.value)?);
        }

        if let Some(tzid) = self.tzid.as_deref().filter(|tzid| !tzid.trim().is_empty()) {
            let tz = lookup_zone(tzid)?;
            tracing::debug!(tzid, local = %self.value, "resolving through zone database");
            return Ok(tz.to_ambiguous_timestamp(self.value).compatible()?);
        }

        if self.origin == Origin::Utc {
            return Ok(TimeZone::UTC.to_timestamp(self.value)?);
        }

        Ok(TimeZone::system()
            .to_ambiguous_timestamp(self.value)
            .compatible()?)
    }

    /// Compare two values.
    ///
    /// Returns `Equal` only for equal values. Otherwise orders by instant,
    /// and returns `None` when the instants are equal or cannot be resolved.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match self.instants(other)? {
            (a, b) if a < b => Some(Ordering::Less),
            (a, b) if a > b => Some(Ordering::Greater),
            _ => None,
        }
    }

    /// Whether this value's instant is before the other's.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.instants(other).is_some_and(|(a, b)| a < b)
    }

    /// Whether this value's instant is after the other's.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.instants(other).is_some_and(|(a, b)| a > b)
    }

    /// Whether this value's instant is before or at the other's.
    #[must_use]
    pub fn is_at_or_before(&self, other: &Self) -> bool {
        self.instants(other).is_some_and(|(a, b)| a <= b)
    }

    /// Whether this value's instant is after or at the other's.
    #[must_use]
    pub fn is_at_or_after(&self, other: &Self) -> bool {
        self.instants(other).is_some_and(|(a, b)| a >= b)
    }

    fn instants(&self, other: &Self) -> Option<(Timestamp, Timestamp)> {
        Some((self.resolve_utc().ok()?, other.resolve_utc().ok()?))
    }

    /// The signed duration from `other` to this value.
    ///
    /// If only one side has an association it is shared with the other.
    ///
    /// ## Errors
    ///
    /// Fails if either instant cannot be resolved.
    pub fn since(&self, other: &Self) -> Result<SignedDuration, DateTimeError> {
        self.associate_with(other);
        Ok(self.resolve_utc()?.duration_since(other.resolve_utc()?))
    }

    /// Add years to the wall-clock reading.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_years(&self, years: i32) -> Result<Self, DateTimeError> {
        self.shifted(Span::new().try_years(years)?, false)
    }

    /// Add months to the wall-clock reading.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_months(&self, months: i32) -> Result<Self, DateTimeError> {
        self.shifted(Span::new().try_months(months)?, false)
    }

    /// Add days to the wall-clock reading.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_days(&self, days: i32) -> Result<Self, DateTimeError> {
        self.shifted(Span::new().try_days(days)?, false)
    }

    /// Add hours, promoting a date to a date-time unless whole days are added.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_hours(&self, hours: i64) -> Result<Self, DateTimeError> {
        self.shifted(Span::new().try_hours(hours)?, hours % 24 != 0)
    }

    /// Add minutes, promoting a date to a date-time unless whole days are added.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_minutes(&self, minutes: i64) -> Result<Self, DateTimeError> {
        self.shifted(Span::new().try_minutes(minutes)?, minutes % 1_440 != 0)
    }

    /// Add seconds, promoting a date to a date-time unless whole days are added.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_seconds(&self, seconds: i64) -> Result<Self, DateTimeError> {
        self.shifted(Span::new().try_seconds(seconds)?, seconds % 86_400 != 0)
    }

    /// Add milliseconds, promoting a date to a date-time unless whole days
    /// are added.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn add_milliseconds(&self, milliseconds: i64) -> Result<Self, DateTimeError> {
        self.shifted(
            Span::new().try_milliseconds(milliseconds)?,
            milliseconds % 86_400_000 != 0,
        )
    }

    /// Add a duration, promoting a date to a date-time unless whole days are
    /// added.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn checked_add(&self, duration: SignedDuration) -> Result<Self, DateTimeError> {
        let value = self.value.checked_add(duration)?;
        Ok(self.derived(value, duration.as_nanos() % NANOS_PER_DAY != 0))
    }

    /// Subtract a duration, promoting a date to a date-time unless whole days
    /// are subtracted.
    ///
    /// ## Errors
    ///
    /// Fails if the result is out of range.
    pub fn checked_sub(&self, duration: SignedDuration) -> Result<Self, DateTimeError> {
        let value = self.value.checked_sub(duration)?;
        Ok(self.derived(value, duration.as_nanos() % NANOS_PER_DAY != 0))
    }

    fn shifted(&self, span: Span, promote: bool) -> Result<Self, DateTimeError> {
        let value = self.value.checked_add(span)?;
        Ok(self.derived(value, promote))
    }

    /// A copy with a new wall-clock reading and a fresh instant cache.
    fn derived(&self, value: civil::DateTime, promote: bool) -> Self {
        Self {
            value,
            origin: self.origin,
            has_date: self.has_date,
            has_time: self.has_time || promote,
            tzid: self.tzid.clone(),
            engine: self.engine.clone(),
            utc: OnceLock::new(),
            association: self.association.clone(),
        }
    }

    /// The same instant as a wall-clock reading in another zone.
    ///
    /// Unbound values are read in the host zone. The result is a UTC value
    /// for `UTC` and a host-local value with the identifier otherwise.
    ///
    /// ## Errors
    ///
    /// Fails for an empty or unknown identifier, or if this value's instant
    /// cannot be resolved.
    pub fn to_time_zone(&self, tzid: &str) -> Result<Self, DateTimeError> {
        if tzid.trim().is_empty() {
            return Err(DateTimeError::EmptyZoneId);
        }

        let target = lookup_zone(tzid)?;
        let zoned = self.resolve_utc()?.to_zoned(target);
        let origin = if tzid.eq_ignore_ascii_case("UTC") {
            Origin::Utc
        } else {
            Origin::HostLocal
        };

        let mut value = Self::build(zoned.datetime(), origin, Some(tzid.to_owned()), None);
        value.has_date = self.has_date;
        value.has_time |= self.has_time;
        value.association = self.association.clone();
        Ok(value)
    }

    /// The instant with the offset in effect, as a [`Zoned`].
    ///
    /// Engine-bound values carry the engine's offset at the instant. Values
    /// with only an identifier use the zone database, and everything else
    /// the host zone.
    ///
    /// ## Errors
    ///
    /// Fails if the instant cannot be resolved or the zone is unknown.
    pub fn to_zoned(&self) -> Result<Zoned, DateTimeError> {
        let ts = self.resolve_utc()?;
        let tz = match (&self.engine, self.tzid.as_deref()) {
            (Some(engine), _) => TimeZone::fixed(engine.offset_at(ts)),
            (None, Some(tzid)) => lookup_zone(tzid)?,
            (None, None) => TimeZone::system(),
        };
        Ok(ts.to_zoned(tz))
    }

    /// Attach an association, unless one is already attached.
    ///
    /// Returns whether the association was attached.
    pub fn associate(&self, association: Association) -> bool {
        self.association.set(association).is_ok()
    }

    /// The attached association, if any.
    #[must_use]
    pub fn association(&self) -> Option<&Association> {
        self.association.get()
    }

    /// Share the association of whichever side has one with the other side.
    pub fn associate_with(&self, other: &Self) {
        match (self.association.get(), other.association.get()) {
            (None, Some(theirs)) => {
                self.associate(theirs.clone());
            }
            (Some(ours), None) => {
                other.associate(ours.clone());
            }
            _ => {}
        }
    }
}

fn lookup_zone(tzid: &str) -> Result<TimeZone, DateTimeError> {
    TimeZone::get(tzid).map_err(|source| DateTimeError::UnknownZone {
        tzid: tzid.to_owned(),
        source,
    })
}

/// Values whose instant cannot be resolved are unequal to every value,
/// themselves included.
impl PartialEq for DateTimeValue {
    fn eq(&self, other: &Self) -> bool {
        let same_zone = match (self.tzid(), other.tzid()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        };
        self.value == other.value
            && self.has_date == other.has_date
            && same_zone
            && self.instants(other).is_some_and(|(a, b)| a == b)
    }
}

impl Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.has_date, self.has_time) {
            (true, true) => write!(f, "{}", self.value)?,
            (false, true) => write!(f, "{}", self.value.time())?,
            _ => write!(f, "{}", self.value.date())?,
        }
        match &self.tzid {
            Some(tzid) if !tzid.is_empty() => write!(f, " {tzid}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday, date, datetime, time};
    use jiff::tz::Offset;

    use super::*;
    use crate::tz::{AnnualRule, TransitionRule};

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn infers_time_presence() {
        assert!(!DateTimeValue::new(datetime(2023, 1, 1, 0, 0, 0, 0)).has_time());
        assert!(DateTimeValue::new(datetime(2023, 1, 1, 0, 0, 1, 0)).has_time());
        let date_only = DateTimeValue::from_date(date(2023, 1, 1));
        assert!(date_only.has_date());
        assert!(!date_only.has_time());
    }

    #[test]
    fn rejects_mismatched_engine() {
        let engine = Arc::new(TimezoneEngine::fixed("Europe/Moscow", Offset::constant(3)));
        let err = DateTimeValue::with_engine(datetime(2023, 1, 1, 0, 0, 0, 0), "Europe/Paris", engine)
            .unwrap_err();
        assert!(matches!(err, DateTimeError::ArgumentContract { .. }));
    }

    #[test]
    fn resolves_by_precedence() {
        let local = datetime(2023, 10, 29, 3, 0, 0, 0);

        let engine = Arc::new(TimezoneEngine::fixed("Custom/Zone", Offset::constant(3)));
        let bound = DateTimeValue::with_engine(local, "Custom/Zone", engine).unwrap();
        assert_eq!(bound.resolve_utc().unwrap(), ts("2023-10-29T00:00:00Z"));

        let named = DateTimeValue::in_zone(local, "Europe/Moscow");
        assert_eq!(named.resolve_utc().unwrap(), ts("2023-10-29T00:00:00Z"));

        let utc = DateTimeValue::utc(local);
        assert_eq!(utc.resolve_utc().unwrap(), ts("2023-10-29T03:00:00Z"));

        let unknown = DateTimeValue::in_zone(local, "Nowhere/Special");
        assert!(matches!(
            unknown.resolve_utc().unwrap_err(),
            DateTimeError::UnknownZone { .. }
        ));
    }

    #[test]
    fn zone_database_is_lenient() {
        // Skipped hour in Europe/Berlin resolves forward instead of failing.
        let gap = DateTimeValue::in_zone(datetime(2023, 3, 26, 2, 30, 0, 0), "Europe/Berlin");
        assert_eq!(gap.resolve_utc().unwrap(), ts("2023-03-26T01:30:00Z"));
    }

    #[test]
    fn equality_is_finer_than_ordering() {
        let a = DateTimeValue::in_zone(datetime(2023, 6, 1, 12, 0, 0, 0), "Europe/London");
        let b = DateTimeValue::in_zone(datetime(2023, 6, 1, 12, 0, 0, 0), "Europe/Dublin");
        assert_eq!(a.resolve_utc().unwrap(), b.resolve_utc().unwrap());
        assert!(a.is_at_or_before(&b) && a.is_at_or_after(&b));
        assert_ne!(a, b);
        assert_eq!(a.compare(&b), None);

        let c = DateTimeValue::in_zone(datetime(2023, 6, 1, 12, 0, 0, 0), "europe/london");
        assert_eq!(a, c);
        assert_eq!(a.compare(&c), Some(Ordering::Equal));
    }

    #[test]
    fn unresolvable_values_are_never_equal() {
        let rule = AnnualRule {
            standard: Offset::constant(0),
            daylight: Offset::constant(1),
            start: TransitionRule {
                month: 3,
                week: 5,
                weekday: Weekday::Sunday,
                time: time(1, 0, 0, 0),
            },
            end: TransitionRule {
                month: 10,
                week: 5,
                weekday: Weekday::Sunday,
                time: time(2, 0, 0, 0),
            },
            valid_from: date(1996, 10, 27),
        };
        let engine = Arc::new(TimezoneEngine::annual("Europe/London", rule));
        let gap =
            DateTimeValue::with_engine(datetime(2023, 3, 26, 1, 30, 0, 0), "Europe/London", engine)
                .unwrap();
        let unknown = DateTimeValue::in_zone(datetime(2023, 1, 1, 0, 0, 0, 0), "Nowhere/Zone");

        for value in [gap, unknown] {
            assert!(value.resolve_utc().is_err());
            let copy = value.clone();
            assert_ne!(value, copy);
            assert_eq!(value.compare(&copy), None);
            assert!(!value.is_at_or_before(&copy));
            assert!(!value.is_at_or_after(&copy));
        }
    }

    #[test]
    fn arithmetic_promotes_dates() {
        let day = DateTimeValue::from_date(date(2023, 1, 1));

        assert!(!day.add_days(3).unwrap().has_time());
        assert!(!day.add_hours(48).unwrap().has_time());
        assert!(day.add_hours(5).unwrap().has_time());
        assert!(day.add_minutes(-30).unwrap().has_time());
        assert!(!day.add_seconds(86_400).unwrap().has_time());
        assert!(day.add_milliseconds(1).unwrap().has_time());
        assert!(!day.checked_add(SignedDuration::from_hours(24)).unwrap().has_time());
        assert!(day.checked_add(SignedDuration::from_mins(90)).unwrap().has_time());

        let later = day.add_months(1).unwrap();
        assert_eq!(later.value(), datetime(2023, 2, 1, 0, 0, 0, 0));
        assert_eq!(day.value(), datetime(2023, 1, 1, 0, 0, 0, 0));
    }

    #[test]
    fn arithmetic_keeps_zone_binding() {
        let engine = Arc::new(TimezoneEngine::fixed("Custom/Zone", Offset::constant(3)));
        let value =
            DateTimeValue::with_engine(datetime(2023, 1, 1, 9, 0, 0, 0), "Custom/Zone", engine)
                .unwrap();
        let later = value.add_hours(2).unwrap();
        assert_eq!(later.tzid(), Some("Custom/Zone"));
        assert!(later.engine().is_some());
        assert_eq!(later.resolve_utc().unwrap(), ts("2023-01-01T08:00:00Z"));
        assert_eq!(
            later.since(&value).unwrap(),
            SignedDuration::from_hours(2)
        );
    }

    #[test]
    fn shares_association() {
        let a = DateTimeValue::utc(datetime(2023, 1, 1, 9, 0, 0, 0));
        let b = DateTimeValue::utc(datetime(2023, 1, 1, 10, 0, 0, 0));
        assert!(b.associate(Association::new("VEVENT", "DTEND")));
        assert!(!b.associate(Association::new("VEVENT", "DTSTART")));

        assert_eq!(b.since(&a).unwrap(), SignedDuration::from_hours(1));
        assert_eq!(a.association(), Some(&Association::new("VEVENT", "DTEND")));
    }

    #[test]
    fn renders_date_time_and_zone() {
        let value = DateTimeValue::in_zone(datetime(2023, 2, 6, 11, 55, 35, 0), "Europe/Paris");
        assert_eq!(value.to_string(), "2023-02-06T11:55:35 Europe/Paris");
        assert_eq!(
            DateTimeValue::from_date(date(2023, 2, 6)).to_string(),
            "2023-02-06"
        );
    }
}
